use crate::annotate::{ATTR_GROUP, ATTR_KEY};
use crate::*;

const TWO_POINTS: &str = r##"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
 <g id="axes_1">
  <g id="PathCollection_1">
   <path id="p0" d="M 10 10 L 11 11"/>
   <path id="p1" d="M 20 20 L 21 21"/>
  </g>
 </g>
</svg>"##;

const CONTRACT: &str = r#"{
  "tooltip_x_shift": 5,
  "tooltip_y_shift": 5,
  "axes": { "axes_1": { "tooltip_labels": ["A", "B"], "tooltip_groups": [0, 1] } }
}"#;

fn mounted() -> Runtime {
    Runtime::mount(TWO_POINTS, CONTRACT, RuntimeOptions::default()).unwrap()
}

#[test]
fn hovering_a_point_shows_its_label_next_to_the_cursor() {
    let mut rt = mounted();
    assert_eq!(rt.elements().len(), 2);

    let first = rt.key_for_id("p0").unwrap();
    let t = rt.dispatch(PointerEvent::Enter {
        target: first,
        at: Point::new(50.0, 60.0),
    });
    assert_eq!(t, Transition::Shown);

    let visible = rt.state().visible().unwrap();
    assert_eq!(visible.content.as_deref(), Some("A"));
    assert_eq!(visible.position, Point::new(55.0, 65.0));
    assert_eq!(rt.highlighted(), vec![first]);

    let second = rt.key_for_id("p1").unwrap();
    assert_eq!(rt.visual(first), ElementVisual::Hovered);
    assert_eq!(rt.visual(second), ElementVisual::Dimmed);
    assert_eq!(rt.visual(ElementKey(99)), ElementVisual::Idle);

    assert_eq!(
        rt.dispatch(PointerEvent::Leave { target: first }),
        Transition::Hidden
    );
    assert!(!rt.state().is_visible());
    assert_eq!(rt.visual(second), ElementVisual::Idle);
}

#[test]
fn shared_groups_highlight_together() {
    let contract = r#"{"axes": {"axes_1": {"tooltip_labels": ["A", "B"], "tooltip_groups": ["g", "g"]}}}"#;
    let mut rt = Runtime::mount(TWO_POINTS, contract, RuntimeOptions::default()).unwrap();
    let first = rt.key_for_id("p0").unwrap();
    rt.dispatch(PointerEvent::Enter {
        target: first,
        at: Point::default(),
    });
    assert_eq!(rt.highlighted().len(), 2);
}

#[test]
fn viewport_clamps_positions() {
    let options = RuntimeOptions::default().with_viewport(Viewport::new(200.0, 100.0));
    let mut rt = Runtime::mount(TWO_POINTS, CONTRACT, options).unwrap();
    let first = rt.key_for_id("p0").unwrap();
    rt.dispatch(PointerEvent::Enter {
        target: first,
        at: Point::new(199.0, 99.0),
    });
    let pos = rt.state().visible().unwrap().position;
    // "A" with default metrics is 23 x 34.
    assert_eq!(pos, Point::new(171.0, 60.0));

    rt.set_viewport(None);
    rt.dispatch(PointerEvent::Move {
        target: first,
        at: Point::new(199.0, 99.0),
    });
    assert_eq!(
        rt.state().visible().unwrap().position,
        Point::new(204.0, 104.0)
    );
}

#[test]
fn rebind_discards_previous_elements_and_state() {
    let mut rt = mounted();
    let first = rt.key_for_id("p0").unwrap();
    rt.dispatch(PointerEvent::Enter {
        target: first,
        at: Point::default(),
    });
    assert!(rt.state().is_visible());
    assert_eq!(rt.generation(), 1);

    let replaced = TWO_POINTS.replace("p0", "q0").replace("p1", "q1");
    rt.rebind(&replaced).unwrap();

    assert_eq!(rt.generation(), 2);
    assert!(!rt.state().is_visible());
    assert!(rt.highlighted().is_empty());
    assert_eq!(rt.key_for_id("p0"), None);
    assert_eq!(rt.elements().len(), 2);
    assert!(rt.key_for_id("q0").is_some());
    assert_eq!(rt.svg(), replaced);
}

#[test]
fn failed_rebind_leaves_nothing_bound() {
    let mut rt = mounted();
    let err = rt.rebind("<svg><g id=\"axes_2\"/></svg>").unwrap_err();
    assert!(matches!(err, Error::MissingAxisContainer { ref axis } if axis == "axes_1"));
    assert!(rt.elements().is_empty());
    assert_eq!(
        rt.dispatch(PointerEvent::Enter {
            target: ElementKey(0),
            at: Point::default(),
        }),
        Transition::Ignored
    );
}

#[test]
fn malformed_contract_is_a_parse_error() {
    let err = Runtime::mount(TWO_POINTS, "{not json", RuntimeOptions::default()).unwrap_err();
    assert!(matches!(err, Error::ContractParse { .. }));

    let err = Runtime::mount(
        TWO_POINTS,
        r#"{"axes": {"first": {"tooltip_labels": [], "tooltip_groups": []}}}"#,
        RuntimeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::ContractParse { .. }));
}

#[test]
fn strict_runtime_rejects_count_mismatch() {
    let contract = r#"{"axes": {"axes_1": {"tooltip_labels": ["only one"], "tooltip_groups": [0]}}}"#;
    let err = Runtime::mount(TWO_POINTS, contract, RuntimeOptions::strict()).unwrap_err();
    assert!(matches!(
        err,
        Error::ClassificationMismatch {
            primitives: 2,
            entries: 1,
            ..
        }
    ));

    let rt = Runtime::mount(TWO_POINTS, contract, RuntimeOptions::default()).unwrap();
    assert_eq!(rt.elements().len(), 1);
    assert_eq!(rt.classification().unclassified.len(), 1);
}

#[test]
fn key_at_offset_resolves_start_tags() {
    let rt = mounted();
    let offset = TWO_POINTS.find("<path id=\"p1\"").unwrap();
    assert_eq!(rt.key_at_offset(offset), rt.key_for_id("p1"));
    assert_eq!(rt.key_at_offset(offset + 1), None);
}

#[test]
fn annotated_svg_carries_keys_and_drops_the_prolog() {
    let rt = mounted();
    let html = rt.annotated_svg().unwrap();
    assert!(html.starts_with("<svg"));
    assert!(!html.contains("<?xml"));
    assert!(html.contains(
        r#"<path data-hp-kind="point" data-hp-key="0" data-hp-axis="1" data-hp-index="0" data-hp-group="0" id="p0""#
    ));
    assert!(html.contains(&format!(r#"{ATTR_KEY}="1""#)));
    assert!(html.contains(&format!(r#"{ATTR_GROUP}="1""#)));

    // Annotated output binds again and is not annotated twice.
    let rebound = crate::classify(&html, rt.contract(), &ClassifyOptions::default()).unwrap();
    assert_eq!(rebound.elements.len(), 2);
    let twice = annotate_svg(&html, &rebound).unwrap();
    assert_eq!(twice, html);

    // Re-annotating under another contract replaces every stale attribute.
    let regrouped = r#"{"axes": {"axes_1": {"tooltip_labels": ["A", "B"], "tooltip_groups": ["g", "g"]}}}"#;
    let rt = Runtime::mount(&html, regrouped, RuntimeOptions::strict()).unwrap();
    let again = rt.annotated_svg().unwrap();
    assert_eq!(again.matches(&format!(r#"{ATTR_GROUP}="&quot;g&quot;""#)).count(), 2);
    assert!(!again.contains(&format!(r#"{ATTR_GROUP}="0""#)));
    assert!(!again.contains(&format!(r#"{ATTR_GROUP}="1""#)));
    assert_eq!(again.matches("data-hp-kind=").count(), 2);
    assert_eq!(again.matches("data-hp-key=").count(), 2);
}

#[test]
fn annotation_drops_attributes_of_elements_that_no_longer_classify() {
    let stale = r#"<svg><g id="axes_1"><g id="PathCollection_1"><path id="p0" data-hp-kind="point" data-hp-group="9"/></g></g><rect data-hp-key="7" data-hp-kind="bar" width="1"/></svg>"#;
    let rt = Runtime::mount(stale, r#"{"axes": {}}"#, RuntimeOptions::default()).unwrap();
    let html = rt.annotated_svg().unwrap();
    assert!(!html.contains("data-hp-group"));
    assert!(!html.contains("data-hp-key"));
    assert!(html.contains(r#"<rect width="1"/>"#));
}

#[test]
fn error_marker_escapes_the_message() {
    let err = Error::MissingAxisContainer {
        axis: "<axes_1>".to_string(),
    };
    let marker = error_marker(&err);
    assert!(marker.starts_with(r#"<div class="hoverplot-error""#));
    assert!(marker.contains("&lt;axes_1&gt;"));
}

#[test]
fn uneven_labels_and_groups_never_mount() {
    let contract = r#"{"axes": {"axes_1": {"tooltip_labels": ["A", "B"], "tooltip_groups": [1]}}}"#;
    for options in [RuntimeOptions::strict(), RuntimeOptions::default()] {
        let err = Runtime::mount(TWO_POINTS, contract, options).unwrap_err();
        assert!(matches!(err, Error::ContractParse { .. }));
    }
}

const TWO_AXES: &str = r#"<svg>
 <g id="axes_1"><g id="PathCollection_1"><path id="a0"/><path id="a1"/></g></g>
 <g id="axes_2"><g id="PathCollection_1"><path id="b0"/><path id="b1"/></g></g>
</svg>"#;

#[test]
fn positional_groups_link_entries_across_subplots() {
    let contract = r#"{"axes": {
      "axes_1": {"tooltip_labels": ["A0", "A1"], "tooltip_groups": [0, 1]},
      "axes_2": {"tooltip_labels": ["B0", "B1"], "tooltip_groups": [0, 1]}
    }}"#;
    let mut rt = Runtime::mount(TWO_AXES, contract, RuntimeOptions::strict()).unwrap();
    let a0 = rt.key_for_id("a0").unwrap();
    let b0 = rt.key_for_id("b0").unwrap();
    rt.dispatch(PointerEvent::Enter {
        target: a0,
        at: Point::new(1.0, 1.0),
    });
    assert_eq!(rt.highlighted(), vec![a0, b0]);
    assert_eq!(rt.visual(b0), ElementVisual::Hovered);
    assert_eq!(rt.visual(rt.key_for_id("b1").unwrap()), ElementVisual::Dimmed);

    // Distinct groups keep the subplots apart.
    let isolated = r#"{"axes": {
      "axes_1": {"tooltip_labels": ["A0", "A1"], "tooltip_groups": ["a0", "a1"]},
      "axes_2": {"tooltip_labels": ["B0", "B1"], "tooltip_groups": ["b0", "b1"]}
    }}"#;
    let mut rt = Runtime::mount(TWO_AXES, isolated, RuntimeOptions::strict()).unwrap();
    let a0 = rt.key_for_id("a0").unwrap();
    rt.dispatch(PointerEvent::Enter {
        target: a0,
        at: Point::new(1.0, 1.0),
    });
    assert_eq!(rt.highlighted(), vec![a0]);
}
