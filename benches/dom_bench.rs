use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nexusnet::{Document, Selector};

fn listing_page(rows: usize) -> String {
    let mut html = String::from("<html><body><table id=\"results\">");
    for i in 0..rows {
        html.push_str(&format!(
            "<tr class=\"row\"><td><a href=\"https://example.com/item/{i}\" class=\"link\">Item {i}</a><td>{i} &euro;<td><img src=\"/t/{i}.png\">"
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("dom_parse");
    for rows in [10, 100, 1000] {
        let html = listing_page(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &html, |b, html| {
            b.iter(|| black_box(Document::parse(html)))
        });
    }
    group.finish();
}

fn benchmark_select(c: &mut Criterion) {
    let doc = Document::parse(&listing_page(1000));
    let selector = Selector::parse("#results tr.row > td a[href^='https']").unwrap();

    c.bench_function("dom_select_parsed", |b| {
        b.iter(|| black_box(doc.select_parsed(black_box(&selector))))
    });

    c.bench_function("dom_select_list", |b| {
        b.iter(|| black_box(doc.select(black_box("img, a.link, td")).map(|n| n.len())))
    });
}

fn benchmark_serialize(c: &mut Criterion) {
    let doc = Document::parse(&listing_page(1000));

    c.bench_function("dom_text", |b| b.iter(|| black_box(doc.text())));
    c.bench_function("dom_html", |b| b.iter(|| black_box(doc.html())));
}

criterion_group!(benches, benchmark_parse, benchmark_select, benchmark_serialize);
criterion_main!(benches);
