use crate::attribute::Attributes;
use crate::error::ReceiveError;
use crate::location::SourceLocation;
use crate::name::Name;

/// The consumer side of a document event stream.
///
/// A producer pushes one call per event, in document order. Every method
/// defaults to a no-op so consumers implement only what they care about.
/// Consumers must not assume the stream is well formed: balanced elements
/// and single document boundaries are the producer's obligation, and a
/// consumer that needs them enforced should sit behind a validating
/// adapter.
///
/// Two hooks fall outside the event set proper:
///
/// - [`document_locator`](Self::document_locator) is called at most once,
///   before any located event, when the producer can report source
///   positions. It carries the document's public identifier, if any.
/// - [`location`](Self::location) is called before each event that has a
///   known position. Prefix mapping events never carry one. A consumer
///   that ignores these two hooks sees the plain event stream.
pub trait XmlReceiver {
    /// The producer will report source positions; `public_id` is the
    /// document's public identifier, if known.
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        let _ = public_id;
        Ok(())
    }

    /// Position of the next event. Only called after
    /// [`document_locator`](Self::document_locator).
    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        let _ = location;
        Ok(())
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        let _ = (prefix, uri);
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        let _ = prefix;
        Ok(())
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        let _ = (name, attributes);
        Ok(())
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        let _ = name;
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        let _ = text;
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        let _ = text;
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        let _ = (target, data);
        Ok(())
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        let _ = name;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        let _ = text;
        Ok(())
    }
}

impl<R: XmlReceiver + ?Sized> XmlReceiver for &mut R {
    fn document_locator(&mut self, public_id: Option<&str>) -> Result<(), ReceiveError> {
        (**self).document_locator(public_id)
    }

    fn location(&mut self, location: &SourceLocation) -> Result<(), ReceiveError> {
        (**self).location(location)
    }

    fn start_document(&mut self) -> Result<(), ReceiveError> {
        (**self).start_document()
    }

    fn end_document(&mut self) -> Result<(), ReceiveError> {
        (**self).end_document()
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ReceiveError> {
        (**self).start_prefix_mapping(prefix, uri)
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ReceiveError> {
        (**self).end_prefix_mapping(prefix)
    }

    fn start_element(&mut self, name: Name<'_>, attributes: &Attributes) -> Result<(), ReceiveError> {
        (**self).start_element(name, attributes)
    }

    fn end_element(&mut self, name: Name<'_>) -> Result<(), ReceiveError> {
        (**self).end_element(name)
    }

    fn characters(&mut self, text: &str) -> Result<(), ReceiveError> {
        (**self).characters(text)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<(), ReceiveError> {
        (**self).ignorable_whitespace(text)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ReceiveError> {
        (**self).processing_instruction(target, data)
    }

    fn skipped_entity(&mut self, name: &str) -> Result<(), ReceiveError> {
        (**self).skipped_entity(name)
    }

    fn comment(&mut self, text: &str) -> Result<(), ReceiveError> {
        (**self).comment(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingReceiver {
        events: usize,
        locations: usize,
    }

    impl XmlReceiver for CountingReceiver {
        fn location(&mut self, _location: &SourceLocation) -> Result<(), ReceiveError> {
            self.locations += 1;
            Ok(())
        }

        fn start_element(
            &mut self,
            _name: Name<'_>,
            _attributes: &Attributes,
        ) -> Result<(), ReceiveError> {
            self.events += 1;
            Ok(())
        }
    }

    #[test]
    fn default_methods_are_noops() {
        struct Inert;
        impl XmlReceiver for Inert {}

        let mut r = Inert;
        r.start_document().unwrap();
        r.characters("text").unwrap();
        r.comment("note").unwrap();
        r.end_document().unwrap();
    }

    #[test]
    fn mut_reference_forwards() {
        let mut counting = CountingReceiver {
            events: 0,
            locations: 0,
        };

        fn drive<R: XmlReceiver>(mut receiver: R) -> Result<(), ReceiveError> {
            receiver.location(&SourceLocation::new(1, 1, None))?;
            receiver.start_element(Name::local("root"), &Attributes::new())?;
            receiver.end_element(Name::local("root"))
        }

        drive(&mut counting).unwrap();
        assert_eq!(counting.events, 1);
        assert_eq!(counting.locations, 1);
    }
}
