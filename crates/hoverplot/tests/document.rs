use hoverplot::css;
use hoverplot::html::{fill_template, script_json};
use hoverplot::{
    DocumentError, Error, InteractivePlot, PageOptions, RenderContext, RuntimeOptions,
    TooltipArgs, html_output_path,
};
use serde_json::json;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("matplotlib")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()))
}

fn embedded_contract(html: &str) -> serde_json::Value {
    let start = html.find("<script type=\"application/json\"").unwrap();
    let body_start = start + html[start..].find('>').unwrap() + 1;
    let body_end = body_start + html[body_start..].find("</script>").unwrap();
    serde_json::from_str(&html[body_start..body_end]).unwrap()
}

#[test]
fn html_output_path_appends_extension_only_when_missing() {
    assert_eq!(html_output_path("chart"), PathBuf::from("chart.html"));
    assert_eq!(html_output_path("out/chart.html"), PathBuf::from("out/chart.html"));
    assert_eq!(html_output_path("chart.HTM"), PathBuf::from("chart.HTM"));
    assert_eq!(html_output_path("chart.svg"), PathBuf::from("chart.svg.html"));
}

#[test]
fn page_embeds_contract_svg_and_styles() {
    let html = InteractivePlot::from_svg(fixture("scatter_legend.svg"))
        .unwrap()
        .add_tooltip(
            TooltipArgs::new()
                .labels(vec!["s1", "s2", "v1", "v2"])
                .groups(vec!["setosa", "setosa", "virginica", "virginica"])
                .shift(8, -4),
        )
        .unwrap()
        .with_css(".tooltip { color: red; }")
        .with_javascript("console.log('ready');")
        .as_html(&RenderContext::bundled(), &PageOptions::default())
        .unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Made with hoverplot</title>"));
    assert!(!html.contains("rel=\"icon\""));
    assert!(html.contains(".tooltip { color: red; }"));
    assert!(html.contains("console.log('ready');"));
    assert!(html.contains("function hoverplotMount"));
    assert!(!html.contains("{{"));
    assert!(!html.contains("<?xml"));
    assert_eq!(html.matches("data-hp-key=").count(), 6);

    let contract = embedded_contract(&html);
    assert_eq!(contract["tooltip_x_shift"], json!(8));
    assert_eq!(contract["tooltip_y_shift"], json!(-4));
    assert_eq!(
        contract["axes"]["axes_1"]["tooltip_labels"],
        json!(["s1", "s2", "v1", "v2", "setosa", "virginica"])
    );
}

#[test]
fn every_document_gets_its_own_scope() {
    let plot = InteractivePlot::from_svg(fixture("scatter_legend.svg")).unwrap();
    let ctx = RenderContext::bundled();
    let a = plot.as_html(&ctx, &PageOptions::default()).unwrap();
    let b = plot.as_html(&ctx, &PageOptions::default()).unwrap();

    let scope = |html: &str| {
        let start = html.find("id=\"hoverplot-").unwrap() + "id=\"hoverplot-".len();
        html[start..start + 36].to_string()
    };
    assert_ne!(scope(&a), scope(&b));
    assert!(a.contains(&format!("hoverplotMount(\"{}\")", scope(&a))));
}

#[test]
fn untouched_plot_configures_first_axis_without_labels() {
    let plot = InteractivePlot::from_svg(fixture("subplots.svg")).unwrap();
    let contract = plot.contract().unwrap();
    assert_eq!(contract.axes.len(), 1);
    let spec = contract.axis("axes_1").unwrap();
    assert_eq!(spec.entry_count(), 0);

    let runtime = plot.runtime().unwrap();
    assert!(runtime.elements().is_empty());
}

#[test]
fn unknown_axis_is_rejected() {
    let err = InteractivePlot::from_svg(fixture("subplots.svg"))
        .unwrap()
        .add_tooltip(TooltipArgs::new().labels(vec!["x"]).axis(5))
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Core(Error::UnknownAxis {
            index: 5,
            available: 2
        })
    ));
}

#[test]
fn strict_render_propagates_bind_failures() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="axes_1"><g id="PathCollection_1"><path d="M 0 0"/></g></g></svg>"#;
    let plot = InteractivePlot::from_svg(svg)
        .unwrap()
        .add_tooltip(TooltipArgs::new().labels(vec!["a", "b"]))
        .unwrap();

    // Lenient: one point, two labels. Binds what it can.
    let html = plot
        .as_html(&RenderContext::bundled(), &PageOptions::default())
        .unwrap();
    assert_eq!(html.matches("data-hp-key=").count(), 1);

    let err = plot
        .clone()
        .with_options(RuntimeOptions::strict())
        .as_html(&RenderContext::bundled(), &PageOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Core(Error::ClassificationMismatch { .. })
    ));
}

#[test]
fn page_options_are_substituted_verbatim() {
    let page = PageOptions::default()
        .title("Iris & friends")
        .favicon("https://example.org/icon.ico");
    let html = InteractivePlot::from_svg(fixture("scatter_legend.svg"))
        .unwrap()
        .as_html(&RenderContext::bundled(), &page)
        .unwrap();
    assert!(html.contains("<title>Iris & friends</title>"));
    assert!(html.contains(r#"<link rel="icon" href="https://example.org/icon.ico">"#));
}

#[test]
fn labels_cannot_close_the_data_script() {
    let html = InteractivePlot::from_svg(fixture("scatter_legend.svg"))
        .unwrap()
        .add_tooltip(TooltipArgs::new().labels(vec!["</script><b>x</b>", "b", "c", "d"]))
        .unwrap()
        .as_html(&RenderContext::bundled(), &PageOptions::default())
        .unwrap();
    assert!(!html.contains("</script><b>"));
    let contract = embedded_contract(&html);
    assert_eq!(
        contract["axes"]["axes_1"]["tooltip_labels"][0],
        json!("</script><b>x</b>")
    );
    assert_eq!(script_json(r#"["</b>"]"#), r#"["<\/b>"]"#);
}

#[test]
fn save_writes_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let written = InteractivePlot::from_svg(fixture("scatter_legend.svg"))
        .unwrap()
        .save(
            &RenderContext::bundled(),
            dir.path().join("chart"),
            &PageOptions::default(),
        )
        .unwrap();
    assert_eq!(written, dir.path().join("chart.html"));
    let html = std::fs::read_to_string(&written).unwrap();
    assert!(html.contains("data-hp-kind=\"point\""));
}

#[test]
fn template_placeholders_must_be_known() {
    let out = fill_template("a {{ x }} b {{y}}", &[("x", "1"), ("y", "{{ z }}")]).unwrap();
    assert_eq!(out, "a 1 b {{ z }}");

    let err = fill_template("{{ missing }}", &[]).unwrap_err();
    assert!(matches!(err, DocumentError::Template { ref name } if name == "missing"));
}

#[test]
fn custom_context_is_used() {
    let ctx = RenderContext::bundled().with_template("<main>{{ svg }}</main><i>{{ document_title }}</i>");
    let html = InteractivePlot::from_svg(fixture("subplots.svg"))
        .unwrap()
        .as_html(&ctx, &PageOptions::default().title("t"))
        .unwrap();
    assert!(html.starts_with("<main><svg"));
    assert!(html.ends_with("<i>t</i>"));
}

#[test]
fn css_helpers_render_rules_in_order() {
    let text = css::from_value(&json!({
        ".tooltip": {"color": "red", "font-size": "2em"},
        ".hovered": {"opacity": 1}
    }))
    .unwrap();
    assert_eq!(
        text,
        ".tooltip {\n  color: red;\n  font-size: 2em;\n}\n.hovered {\n  opacity: 1;\n}\n"
    );

    assert!(matches!(
        css::from_value(&json!([1, 2])),
        Err(DocumentError::Css { .. })
    ));
    match css::from_value(&json!({".a": {"b": [1]}})) {
        Err(DocumentError::Css { message }) => assert!(message.ends_with("found array")),
        other => panic!("expected a css error, got {other:?}"),
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("style.css");
    std::fs::write(&path, ".tooltip{font-size: 2em;}").unwrap();
    assert_eq!(css::from_file(&path).unwrap(), ".tooltip{font-size: 2em;}");
    assert!(matches!(
        css::from_file(dir.path().join("missing.css")),
        Err(DocumentError::Io { .. })
    ));
}
