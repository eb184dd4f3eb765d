use nexusnet::{Document, NodeHandle, Selector};

const PAGE: &str = r#"
<div id="main" class="page wide">
  <h1 class="title">Downloads</h1>
  <ul class="files">
    <li><a href="https://cdn.example.com/a.pdf" class="file primary">A</a></li>
    <li><a href="http://mirror.example.com/b.zip" class="file">B</a></li>
    <li><a href="/local/c.pdf" data-size="10">C</a></li>
    <li><a name="anchor">D</a></li>
  </ul>
  <p>Contact <a href="mailto:x@example.com">us</a></p>
</div>
<footer><p class="title">Footer</p></footer>
"#;

fn texts(nodes: &[NodeHandle<'_>]) -> Vec<String> {
    nodes.iter().map(|n| n.text()).collect()
}

fn select(doc: &Document, selector: &str) -> Vec<String> {
    texts(&doc.select(selector).unwrap())
}

#[test]
fn test_simple_selectors() {
    let doc = Document::parse(PAGE);
    assert_eq!(select(&doc, "h1"), ["Downloads"]);
    assert_eq!(select(&doc, "H1"), ["Downloads"]);
    assert_eq!(select(&doc, ".title"), ["Downloads", "Footer"]);
    assert_eq!(select(&doc, "p.title"), ["Footer"]);
    assert_eq!(select(&doc, "#main h1"), ["Downloads"]);
    assert_eq!(select(&doc, ".file.primary"), ["A"]);
    assert_eq!(doc.select("*").unwrap().len(), 15);
    assert!(select(&doc, "#Main").is_empty());
}

#[test]
fn test_attribute_operators() {
    let doc = Document::parse(PAGE);
    assert_eq!(select(&doc, "a[href]"), ["A", "B", "C", "us"]);
    assert_eq!(select(&doc, "[name=anchor]"), ["D"]);
    assert_eq!(select(&doc, r#"a[href="/local/c.pdf"]"#), ["C"]);
    assert_eq!(select(&doc, "a[href^='https']"), ["A"]);
    assert_eq!(select(&doc, "a[href^=http]"), ["A", "B"]);
    assert_eq!(select(&doc, r#"a[href$=".pdf"]"#), ["A", "C"]);
    assert_eq!(select(&doc, "a[href^='http'][href$='.zip']"), ["B"]);
    assert_eq!(select(&doc, "[ data-size = '10' ]"), ["C"]);
    assert_eq!(select(&doc, "[DATA-SIZE]"), ["C"]);
}

#[test]
fn test_empty_operand_matches_nothing() {
    let doc = Document::parse(PAGE);
    assert!(select(&doc, "a[href^='']").is_empty());
    assert!(select(&doc, "a[href$=\"\"]").is_empty());
    assert!(select(&doc, "a[href='']").is_empty());
}

#[test]
fn test_combinators() {
    let doc = Document::parse(PAGE);
    assert_eq!(select(&doc, "ul > li > a"), ["A", "B", "C", "D"]);
    assert_eq!(select(&doc, "div > a"), Vec::<String>::new());
    assert_eq!(select(&doc, "div a"), ["A", "B", "C", "D", "us"]);
    assert_eq!(select(&doc, "div p > a"), ["us"]);
    assert_eq!(select(&doc, "#main>ul   li>a.file"), ["A", "B"]);
}

#[test]
fn test_descendant_skips_non_matching_levels() {
    let doc = Document::parse("<a><x><b/></x></a><b></b>");
    let found = doc.select("a b").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].parent().and_then(|p| p.tag()), Some("x"));
}

#[test]
fn test_child_requires_direct_parent() {
    let doc = Document::parse("<a><x><b/></x></a>");
    assert!(doc.select("a > b").unwrap().is_empty());
    assert_eq!(doc.select("x > b").unwrap().len(), 1);
}

#[test]
fn test_class_conjunction() {
    let doc = Document::parse(r#"<i class="a b c">both</i><i class="a">one</i><i class="b a">swapped</i>"#);
    assert_eq!(select(&doc, ".a.b"), ["both", "swapped"]);
    assert_eq!(select(&doc, "i.a"), ["both", "one", "swapped"]);
}

#[test]
fn test_literal_prefix_and_suffix() {
    let doc = Document::parse(
        r#"<a href="/products/1">p1</a><a href="/product">p0</a><a href="/x/products">px</a>
           <a href="/doc.pdf">pdf</a><a href="/doc.pdf.html">html</a>"#,
    );
    assert_eq!(select(&doc, r#"[href^="/products"]"#), ["p1"]);
    assert_eq!(select(&doc, r#"[href$=".pdf"]"#), ["pdf"]);
}

#[test]
fn test_backtracking_over_ancestors() {
    // The nearest `.x` ancestor has no `section` above it, but a farther one does.
    let doc = Document::parse(
        r#"<section><div class="x"><article><div class="x"><span>hit</span></div></article></div></section>"#,
    );
    assert_eq!(select(&doc, "section > .x span"), ["hit"]);
    assert_eq!(select(&doc, "section > .x > span"), Vec::<String>::new());
    assert_eq!(select(&doc, "article .x > span"), ["hit"]);
}

#[test]
fn test_selector_list_document_order_without_duplicates() {
    let doc = Document::parse(PAGE);
    let nodes = doc.select("p, h1, .title, a.primary").unwrap();
    assert_eq!(texts(&nodes), ["Downloads", "A", "Contact us", "Footer"]);

    let mut ids: Vec<_> = nodes.iter().map(|n| n.id()).collect();
    let len = ids.len();
    ids.dedup();
    assert_eq!(ids.len(), len);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_scoped_select() {
    let doc = Document::parse(PAGE);
    let list = doc.select("ul.files").unwrap()[0];

    assert_eq!(texts(&list.select("a").unwrap()), ["A", "B", "C", "D"]);
    // The scope element itself is not a candidate.
    assert!(list.select("ul").unwrap().is_empty());
    // Ancestors above the scope still count for combinators.
    assert_eq!(list.select("#main a[name]").unwrap().len(), 1);

    let first = list.select_first("a[href$='.zip']").unwrap();
    assert_eq!(first.map(|n| n.text()), Some("B".to_string()));
    assert_eq!(list.select_first("table").unwrap(), None);
}

#[test]
fn test_parsed_selector_reuse() {
    let sel: Selector = "li > a".parse().unwrap();
    assert_eq!(sel.as_str(), "li > a");

    let doc = Document::parse(PAGE);
    let other = Document::parse("<li><a>x</a></li>");
    assert_eq!(doc.select_parsed(&sel).len(), 4);
    assert_eq!(other.select_parsed(&sel).len(), 1);

    let a = other.select("a").unwrap()[0];
    assert!(sel.matches(&other, a.id()));
    assert!(!sel.matches(&other, other.root_id()));
}

#[test]
fn test_syntax_errors() {
    let doc = Document::parse(PAGE);
    for bad in [
        "",
        "a:first-child",
        "li::before",
        "h1 + ul",
        "h1 ~ ul",
        "a[href*=pdf]",
        "a[href~=x]",
        "a[href|=x]",
        "a[href='x]",
        "a[href",
        "ul >",
        "a,,b",
        "#",
        "a!",
    ] {
        let err = doc.select(bad).unwrap_err();
        assert_eq!(err.selector, bad);
        assert!(err.offset <= bad.len(), "{bad:?}: offset {}", err.offset);
    }
}

#[test]
fn test_error_reports_position() {
    let err = Selector::parse("ul > li:hover").unwrap_err();
    assert_eq!(err.offset, 7);
    assert_eq!(err.reason, "pseudo-classes are not supported");
    assert!(err.to_string().contains("offset 7"));
}

#[test]
fn test_select_on_empty_document() {
    let doc = Document::parse("");
    assert!(doc.select("div, p").unwrap().is_empty());
    assert!(doc.select("div[").is_err());
}
