use insta::assert_snapshot;
use serde_json::{json, Value};
use smarty_tpl::runtime::{is_empty, isset};
use smarty_tpl::{
    Compiler, CompilerConfig, Engine, InlineSource, MemoryCache, Result, TemplateDescriptor,
    TplError,
};

fn compile(source: &str) -> String {
    Compiler::default().compile(source)
}

fn braces(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

#[test]
fn test_list_template() {
    let out = compile(
        "<ul>{% if $items|count gt 0 %}{% section name=i loop=$items %}\
<li>{% $items[i].name|escape %}</li>{% / %}{% else %}<li>none</li>{% / %}</ul>",
    );
    assert_snapshot!(out, @"<ul><%if (items.length > 0) { %><%for (var i = 0; i < items.length; i++) { %><li><%=(items[i].name && items[i].name.stringify()).stringify()%></li><% }%><% } else { %><li>none</li><% }%></ul>");
}

#[test]
fn test_strip_assign_calc() {
    let out = compile(
        "{% strip %}{% assign var=\"total\" value=0 %}{% $total = $total + $n %}{% /strip %}\
{% print $total|default %}",
    );
    assert_snapshot!(out, @"<%var total = 0;%><%total = total + n;%><%=((total)).stringify()%>");
}

#[test]
fn test_conditions_chain() {
    let out = compile(
        "{% if $a eq 1 and not $b %}A{% else if $a gte 2 %}B{% elseif $c|empty %}C{% else %}D{% /if %}",
    );
    assert!(out.starts_with("<%if (a == 1 && ! b) { %>A"));
    assert!(out.contains("<% } else if (a >= 2) { %>B"));
    assert!(out.contains("<% } else if ((function (v) {"));
    assert!(out.ends_with("<% } else { %>D<% }%>"));
    assert_eq!(braces(&out), 0);
}

#[test]
fn test_foreach_attribute_form() {
    let out = compile("{% foreach from=\"list\" item=\"x\" %}{% $x %}{% / %}");
    assert!(out.starts_with(
        "<%for (let xIndex = 0, x; xIndex < list.length; xIndex++) { x = list[xIndex];"
    ));
    assert!(out.contains("x.__index = xIndex;"));
    assert!(out.contains("x.__first = list[0];"));
    assert!(out.contains("x.__last = list[list.length - 1];"));
    assert!(out.ends_with("<%=x.stringify()%><% }%>"));
    assert_eq!(braces(&out), 0);
}

#[test]
fn test_foreach_as_form_with_key() {
    let out = compile("{% foreach $rows as $k => $row %}{% $row@index %}{% /foreach %}");
    assert!(out.starts_with(
        "<%for (let rowIndex = 0, k = 0, row; rowIndex < rows.length; rowIndex++, k++) {"
    ));
    assert!(out.contains("<%=row.__index.stringify()%>"));
    assert_eq!(braces(&out), 0);
}

#[test]
fn test_foreach_boxes_scalars() {
    let out = compile("{% foreach $names as $name %}{% / %}");
    assert!(out.contains("if (typeOf(name) != \"object\" || name === null)"));
    assert!(out.contains("valueOf: function () { return value; }"));
}

#[test]
fn test_break_inside_loop() {
    let out = compile("{% foreach $rows as $r %}{% if $r@index gt 3 %}{% break %}{% / %}{% / %}");
    assert!(out.contains("<%if (r.__index > 3) { %><%break;%><% }%><% }%>"));
}

#[test]
fn test_direct_call_in_condition() {
    let out = compile("{% if count($rows) gt 0 %}x{% / %}");
    assert_snapshot!(out, @"<%if (rows.length > 0) { %>x<% }%>");
}

#[test]
fn test_isset_filter_inlines_path() {
    let out = compile("{% if $user.profile.name|isset %}ok{% / %}");
    assert!(out.contains(r#"})(user, ["user", "profile", "name"])"#));
    assert_eq!(braces(&out), 0);
}

#[test]
fn test_custom_meta_prefix() {
    let config = CompilerConfig::new().meta_prefix("_m");
    let compiler = Compiler::new(config).unwrap();
    assert_eq!(compiler.compile("{% $row@first %}"), "<%=row._mfirst.stringify()%>");
}

#[test]
fn test_invalid_config_rejected() {
    let config = CompilerConfig::new().source_tokens("", "%}");
    assert!(matches!(Compiler::new(config), Err(TplError::InvalidConfig(_))));

    let config = CompilerConfig::new().meta_prefix("9x");
    assert!(matches!(Compiler::new(config), Err(TplError::InvalidConfig(_))));
}

#[test]
fn test_config_from_json() {
    let config = CompilerConfig::from_json(r#"{"tplLeftToken": "[%", "tplRightToken": "%]"}"#)
        .unwrap();
    let compiler = Compiler::new(config).unwrap();
    assert_eq!(compiler.compile("{% $a %}"), "[%=a.stringify()%]");
}

#[test]
fn test_literal_text_untouched() {
    let source = "<p>100% { braces } and <% raw %></p>";
    assert_eq!(compile(source), source);
}

#[test]
fn test_runtime_isset_matches_generated_contract() {
    let data = json!({"user": {"profile": {"name": null}, "tags": []}});
    assert!(isset(&data["user"], "user.profile.name"));
    assert!(isset(&data["user"], "user.tags"));
    assert!(!isset(&data["user"], "user.profile.name.first"));
    assert!(!isset(&data["user"], "user.missing.name"));
}

#[test]
fn test_runtime_is_empty() {
    let data = json!({"zero": 0, "text": "0", "blank": "", "list": [], "flag": false});
    assert!(is_empty(data.get("zero")));
    assert!(is_empty(data.get("text")));
    assert!(is_empty(data.get("blank")));
    assert!(is_empty(data.get("absent")));
    assert!(!is_empty(data.get("list")));
    assert!(!is_empty(data.get("flag")));
}

fn describe(template: &TemplateDescriptor<'_>, data: &Value) -> Result<String> {
    Ok(format!("{} => {} with {}", template.id, template.tpl, data))
}

#[test]
fn test_engine_renders_compiled_template() {
    let source = InlineSource::new()
        .add("greeting", "Hi {% $name %}!")
        .add("list", "{% foreach $rows as $r %}{% $r %}{% / %}");
    let engine = Engine::new(source, MemoryCache::new());

    let out = engine
        .format("greeting", &json!({"name": "Ann"}), &describe)
        .unwrap();
    assert_snapshot!(out, @r#"greeting => Hi <%=name.stringify()%>! with {"name":"Ann"}"#);

    engine.format("greeting", &json!({}), &describe).unwrap();
    engine.format("list", &json!({"rows": [1, 2]}), &describe).unwrap();
    assert_eq!(engine.cache().len(), 2);
}

#[test]
fn test_engine_unknown_template() {
    let engine = Engine::new(InlineSource::new(), MemoryCache::new());
    let err = engine.format("nope", &json!({}), &describe).unwrap_err();
    assert_eq!(err.to_string(), "template not found: nope");
}

#[test]
fn test_call_syntax_in_string_literals_survives() {
    assert_eq!(
        compile("{% if $s eq 'Hello (world)' %}x{% / %}"),
        "<%if (s == 'Hello (world)') { %>x<% }%>"
    );
    assert_eq!(compile("{% $label = 'Total (net)' %}"), "<%label = 'Total (net)';%>");
}
