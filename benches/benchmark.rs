//! Performance benchmarks for forum-pathfinder.
//!
//! Run with: `cargo bench`
//!
//! Benchmarks include:
//! - Tree reduction of a synthetic listing page
//! - Table, link and field classification over reduced samples
//! - Listing pages of growing row counts for throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use forum_pathfinder::{
    find_thread_fields, find_thread_link, find_thread_table, reduce, OriginCategory, Options, SamplePage,
    SampleThread,
};

fn listing_html(rows: usize) -> String {
    let body: String = (0..rows)
        .map(|i| {
            format!(
                r#"<tr class="row">
                    <td class="icon"><img src="/i/{i}.png"></td>
                    <td class="subject"><a class="topic" href="/thread/{i}">Fresh database leak number {i}</a></td>
                    <td class="by"><a href="/user/{i}">user{i}</a></td>
                    <td class="stats">{i} replies</td>
                </tr>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Forum</title>
    <script>var tracking = true;</script>
</head>
<body>
    <header><a href="/">Home</a></header>
    <nav><a href="/rules">Rules</a></nav>
    <div class="wrap">
        <table class="threads"><tbody>{body}</tbody></table>
        <table class="online"><tbody><tr><td>42 users online</td></tr></tbody></table>
        <div class="pages"><span>1</span><a href="/forum?page=2">2</a><a class="next" href="/forum?page=2">Next</a></div>
    </div>
    <footer><p>Copyright 2024</p></footer>
</body>
</html>"#
    )
}

fn thread_html() -> String {
    let post = "Full dump attached below. You must reply to view the hidden content. ".repeat(8);
    format!(
        r#"<html><body>
        <div class="crumbs"><a href="/">Forum</a> / <a href="/forum">Leaks</a></div>
        <h1 class="title">Fresh database leak number 7</h1>
        <span class="when">5 March, 2024 - 3:15 PM</span>
        <p class="post">{post}</p>
        <div class="signature"><p>Stay safe</p></div>
        </body></html>"#
    )
}

fn bench_reduce(c: &mut Criterion) {
    let html = listing_html(25);

    c.bench_function("reduce_listing", |b| {
        b.iter(|| reduce::reduce(black_box(&html), OriginCategory::Clearweb));
    });
}

fn bench_classify_listing(c: &mut Criterion) {
    let options = Options::default();
    let pages: Vec<SamplePage> = (0..4)
        .map(|i| {
            let html = reduce::reduce(&listing_html(25), OriginCategory::Clearweb);
            SamplePage::new(format!("https://forum.test/forum?page={i}"), html)
        })
        .collect();

    c.bench_function("classify_table", |b| {
        b.iter(|| find_thread_table(black_box(&pages), black_box(&options)));
    });

    c.bench_function("classify_link", |b| {
        b.iter(|| find_thread_link(black_box(&pages), "div.wrap table.threads tbody", black_box(&options)));
    });
}

fn bench_classify_fields(c: &mut Criterion) {
    let options = Options::default();
    let html = reduce::reduce(&thread_html(), OriginCategory::Clearweb);
    let threads = vec![SampleThread::new("Fresh database leak number 7", html); 8];

    c.bench_function("classify_fields", |b| {
        b.iter(|| find_thread_fields(black_box(&threads), black_box(&options)));
    });
}

/// Table classification as the listing grows.
fn bench_listing_sizes(c: &mut Criterion) {
    let options = Options::default();
    let mut group = c.benchmark_group("listing_rows");

    for rows in [10, 30, 100] {
        let html = reduce::reduce(&listing_html(rows), OriginCategory::Clearweb);
        let pages = vec![SamplePage::new("https://forum.test/", html.clone())];
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(BenchmarkId::new("classify_table", rows), &pages, |b, pages| {
            b.iter(|| find_thread_table(black_box(pages), black_box(&options)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reduce,
    bench_classify_listing,
    bench_classify_fields,
    bench_listing_sizes
);
criterion_main!(benches);
