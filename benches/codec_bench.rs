use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use fiskal::core::Amount;
use fiskal::erechnung::{
    AddressBuilder, Invoice, InvoiceBuilder, LineBuilder, PartyBuilder, TaxCategory, from_cii_xml,
    from_ubl_xml, to_cii_xml, to_ubl_xml,
};
use fiskal::uva::{Period, UvaBuilder, from_u30_xml, to_u30_xml};

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn build_invoice(lines: usize) -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-001", test_date())
        .seller(
            PartyBuilder::new(
                "Muster GmbH",
                AddressBuilder::new("Wien", "1010", "AT")
                    .street("Opernring 1")
                    .build(),
            )
            .vat_id("ATU12345678")
            .build(),
        )
        .buyer(
            PartyBuilder::new(
                "Kunde AG",
                AddressBuilder::new("Graz", "8010", "AT").build(),
            )
            .build(),
        );

    for i in 1..=lines {
        builder = builder.add_line(
            LineBuilder::new(
                &i.to_string(),
                &format!("Position {i}"),
                dec!(2),
                "H87",
                Amount::from_cents(999),
            )
            .tax(TaxCategory::Standard, dec!(20))
            .build(),
        );
    }

    builder.build().unwrap()
}

fn bench_build_invoice(c: &mut Criterion) {
    c.bench_function("build_invoice_10_lines", |b| {
        b.iter(|| black_box(build_invoice(10)));
    });
}

fn bench_ubl_serialize(c: &mut Criterion) {
    let invoice = build_invoice(10);
    c.bench_function("ubl_serialize", |b| {
        b.iter(|| black_box(to_ubl_xml(black_box(&invoice))));
    });

    let large = build_invoice(1000);
    c.bench_function("ubl_serialize_1000_lines", |b| {
        b.iter(|| black_box(to_ubl_xml(black_box(&large))));
    });
}

fn bench_ubl_parse(c: &mut Criterion) {
    let xml = to_ubl_xml(&build_invoice(10)).unwrap();
    c.bench_function("ubl_parse", |b| {
        b.iter(|| black_box(from_ubl_xml(black_box(&xml))));
    });
}

fn bench_cii_roundtrip(c: &mut Criterion) {
    let invoice = build_invoice(10);
    c.bench_function("cii_serialize", |b| {
        b.iter(|| black_box(to_cii_xml(black_box(&invoice))));
    });

    let xml = to_cii_xml(&invoice).unwrap();
    c.bench_function("cii_parse", |b| {
        b.iter(|| black_box(from_cii_xml(black_box(&xml))));
    });
}

fn bench_u30_roundtrip(c: &mut Criterion) {
    let uva = UvaBuilder::new(Period::month(2025, 6))
        .standard_base(Amount::from_cents(8_000_000))
        .reduced_base_10(Amount::from_cents(1_500_000))
        .input_tax(Amount::from_cents(320_000))
        .build()
        .unwrap();

    c.bench_function("u30_serialize", |b| {
        b.iter(|| black_box(to_u30_xml(black_box(&uva))));
    });

    let xml = to_u30_xml(&uva).unwrap();
    c.bench_function("u30_parse", |b| {
        b.iter(|| black_box(from_u30_xml(black_box(&xml))));
    });
}

criterion_group!(
    benches,
    bench_build_invoice,
    bench_ubl_serialize,
    bench_ubl_parse,
    bench_cii_roundtrip,
    bench_u30_roundtrip,
);
criterion_main!(benches);
