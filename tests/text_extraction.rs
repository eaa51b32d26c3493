//! 文本提取集成测试
//!
//! 验证保留格式的纯文本提取规则

use chat_overlay::host::LiveDocument;
use chat_overlay::parsers::html::dom::get_node_attr;
use chat_overlay::parsers::html::text::TextExtractor;

use markup5ever_rcdom::Handle;

mod common {
    include!("common/mod.rs");
}

use common::HtmlTestHelper;

/// 以 `<div id="c">` 包裹片段并返回该元素
fn content(document: &LiveDocument) -> Handle {
    document
        .find_first(|n| get_node_attr(n, "id").as_deref() == Some("c"))
        .expect("content element")
}

fn extract(inner: &str) -> String {
    let document = LiveDocument::from_html(&format!(r#"<div id="c">{}</div>"#, inner));
    TextExtractor::new().extract(&content(&document)).into_string()
}

#[test]
fn test_line_break_becomes_newline() {
    assert_eq!(extract("Hello<br>World"), "Hello\nWorld");
}

#[test]
fn test_nested_blocks_end_with_single_newline() {
    assert_eq!(extract("<p>A</p><p>B</p>"), "A\nB");
}

#[test]
fn test_list_items_get_bullets() {
    let document = LiveDocument::from_html(r#"<ul id="c"><li>item</li></ul>"#);
    let list = content(&document);
    let li = list.children.borrow()[0].clone();

    assert_eq!(TextExtractor::new().extract_raw(&li), "• item\n");
    assert_eq!(TextExtractor::new().extract(&list).as_str(), "• item");
}

#[test]
fn test_list_keeps_one_item_per_line() {
    assert_eq!(
        extract("Todo:<ul><li>first</li><li> second </li><li> </li></ul>"),
        "Todo:• first\n• second"
    );
}

#[test]
fn test_whitespace_and_invisible_content_is_empty() {
    let cases = [
        "",
        "   \n\t  ",
        "<script>alert(1)</script>",
        "<style>p { color: red }</style> <noscript>js</noscript>",
        "<div> </div><p>\n</p>",
    ];
    for case in cases {
        assert_eq!(extract(case), "", "case: {:?}", case);
    }
}

#[test]
fn test_newline_runs_collapse_to_two() {
    assert_eq!(extract("a<br><br><br><br><br>b"), "a\n\nb");
    assert_eq!(extract("a<br><br>b"), "a\n\nb");
}

#[test]
fn test_horizontal_whitespace_collapses() {
    assert_eq!(extract("  lots \t of    space  "), "lots of space");
}

#[test]
fn test_inline_elements_are_flattened() {
    assert_eq!(
        extract(r#"<span class="mention">@bob</span> look at <a href="x">this</a> <em>now</em> <img alt=":)">"#),
        "@bob look at this now"
    );
}

#[test]
fn test_inline_code_is_kept_without_markers() {
    assert_eq!(extract("run <code>cargo_test</code> please"), "run cargo_test please");
}

#[test]
fn test_quotes_and_code_blocks_are_blocks() {
    assert_eq!(
        extract("<blockquote>quoted</blockquote>reply<pre><code>fn main() {}</code></pre>"),
        "quoted\nreplyfn main() {}"
    );
}

#[test]
fn test_overlay_elements_are_ignored() {
    assert_eq!(
        extract(r#"hi there<button data-chat-translator="affordance">翻译</button><div data-chat-translator="panel">翻译：你好</div>"#),
        "hi there"
    );
}

#[test]
fn test_extraction_is_idempotent() {
    let document = LiveDocument::from_html(&HtmlTestHelper::create_chat_page());
    let node = HtmlTestHelper::by_id(&document, "message-content-1");
    let extractor = TextExtractor::new();

    let first = extractor.extract(&node);
    for _ in 0..10 {
        assert_eq!(extractor.extract(&node), first);
    }
    assert_eq!(first.as_str(), "Hello world\nsecond line");
}
