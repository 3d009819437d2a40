use saxtape_types::XmlReceiver;

/// A receiver that absorbs every event.
///
/// Useful as the downstream of adapters that are driven for their side
/// effects only, and as the terminal receiver in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReceiver;

impl XmlReceiver for NullReceiver {}

#[cfg(test)]
mod tests {
    use super::*;
    use saxtape_types::{Attributes, Name};

    #[test]
    fn absorbs_everything() {
        let mut null = NullReceiver;
        null.start_document().unwrap();
        null.start_element(Name::local("a"), &Attributes::new()).unwrap();
        null.characters("text").unwrap();
        null.end_element(Name::local("a")).unwrap();
        null.end_document().unwrap();
    }
}
