use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nexusnet::CookieJar;
use url::Url;

fn benchmark_cookie_insert(c: &mut Criterion) {
    let jar = CookieJar::new();
    let url = Url::parse("https://example.com").unwrap();

    c.bench_function("cookie_parse_and_save", |b| {
        b.iter(|| {
            jar.parse_and_save_cookie(black_box(&url), black_box("foo=bar; Path=/; Secure"));
        })
    });
}

fn benchmark_cookie_get(c: &mut Criterion) {
    let jar = CookieJar::new();
    let url = Url::parse("https://www.example.com/foo/bar").unwrap();
    // Pre-populate
    for i in 0..40 {
        jar.parse_and_save_cookie(&url, &format!("cookie{}=val; Path=/foo", i));
        jar.parse_and_save_cookie(&url, &format!("shared{}=val; Domain=example.com", i));
    }

    c.bench_function("cookie_header_for_url", |b| {
        b.iter(|| {
            black_box(jar.cookie_header(black_box(&url)));
        })
    });
}

fn benchmark_netscape_export(c: &mut Criterion) {
    let jar = CookieJar::new();
    for site in 0..50 {
        let url = Url::parse(&format!("https://site{site}.example.com/")).unwrap();
        for i in 0..10 {
            jar.parse_and_save_cookie(&url, &format!("c{i}=v; Max-Age=3600"));
        }
    }

    c.bench_function("cookie_netscape_export", |b| {
        b.iter(|| black_box(jar.export_netscape()))
    });
}

criterion_group!(
    benches,
    benchmark_cookie_insert,
    benchmark_cookie_get,
    benchmark_netscape_export
);
criterion_main!(benches);
