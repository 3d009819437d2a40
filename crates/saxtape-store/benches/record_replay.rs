use criterion::{black_box, criterion_group, criterion_main, Criterion};
use saxtape_receivers::NullReceiver;
use saxtape_store::Tape;
use saxtape_types::{Attribute, Attributes, Name, XmlReceiver};

fn record_document(tape: &mut Tape, elements: usize) {
    tape.start_document().unwrap();
    tape.start_element(Name::local("root"), &Attributes::new()).unwrap();
    for i in 0..elements {
        let mut attrs = Attributes::new();
        attrs.push(Attribute::cdata("", "id", "id", i.to_string()));
        tape.start_element(Name::local("item"), &attrs).unwrap();
        tape.characters("some element content").unwrap();
        tape.end_element(Name::local("item")).unwrap();
    }
    tape.end_element(Name::local("root")).unwrap();
    tape.end_document().unwrap();
}

fn bench_record(c: &mut Criterion) {
    c.bench_function("record_1k_elements", |b| {
        b.iter(|| {
            let mut tape = Tape::new();
            record_document(&mut tape, black_box(1_000));
            tape
        })
    });
}

fn bench_replay(c: &mut Criterion) {
    let mut tape = Tape::new();
    record_document(&mut tape, 1_000);
    c.bench_function("replay_1k_elements", |b| {
        b.iter(|| tape.replay(&mut NullReceiver).unwrap())
    });
}

fn bench_codec(c: &mut Criterion) {
    let mut tape = Tape::new();
    record_document(&mut tape, 1_000);
    let bytes = tape.to_bytes();
    c.bench_function("encode_1k_elements", |b| b.iter(|| tape.to_bytes()));
    c.bench_function("decode_1k_elements", |b| {
        b.iter(|| Tape::from_bytes(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_record, bench_replay, bench_codec);
criterion_main!(benches);
