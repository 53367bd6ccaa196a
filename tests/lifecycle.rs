//! End-to-end lifecycle behavior against a recording transport.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use kayako::registry::{FieldDef, Parent};
use kayako::transport::{Method, ParamValue, Parameters, Transport};
use kayako::xml::{parse, Element};
use kayako::{Entity, KayakoError, Key, Lifecycle, Scope, Slot};

kayako::entity! {
    /// A test entity with one required field and a response-only identifier.
    pub struct Widget {
        controller: "/Test/Widget",
        tag: "widget",
        list: Some("ListAll"),
        identifier: ID,
        parent: None,
        label: NAME,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        NAME => FieldDef::string("name"),
        COUNT => FieldDef::int("count"),
    }
    add: [NAME, COUNT], required: [NAME];
    save: [NAME, COUNT], required: [NAME];
}

kayako::entity! {
    /// A child entity addressed through its owning widget.
    pub struct Part {
        controller: "/Test/Part",
        tag: "part",
        list: Some("ListAll"),
        identifier: ID,
        parent: Some(Parent { field: Self::WIDGETID.name(), in_path: true }),
        label: LABEL,
        validate_add: None,
    }
    fields {
        ID => FieldDef::int("id"),
        WIDGETID => FieldDef::int("widgetid"),
        LABEL => FieldDef::string("label"),
    }
    add: [WIDGETID, LABEL], required: [WIDGETID];
    save: [], required: [];
}

type Call = (String, Method, Parameters);

enum Reply {
    Xml(&'static str),
    NotFound,
}

/// Records every exchange and replays queued replies in order.
#[derive(Default)]
struct Recorder {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    fn new() -> Self {
        Self::default()
    }

    fn reply(self, xml: &'static str) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Xml(xml));
        self
    }

    fn not_found(self) -> Self {
        self.replies.lock().unwrap().push_back(Reply::NotFound);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn exchange(
        &self,
        path: &str,
        method: Method,
        parameters: &Parameters,
    ) -> Result<Element, KayakoError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), method, parameters.clone()));
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Xml(xml)) => parse(xml),
            Some(Reply::NotFound) => Err(KayakoError::not_found(path)),
            None => parse("<empty/>"),
        }
    }
}

fn single(value: &str) -> ParamValue {
    ParamValue::Single(value.to_string())
}

#[tokio::test]
async fn test_widget_create_update_delete() {
    let transport = Recorder::new()
        .reply("<widgets><widget><id>7</id><name>foo</name><count>0</count></widget></widgets>")
        .reply("<widgets><widget><id>7</id><name>bar</name><count>0</count></widget></widgets>")
        .reply("<empty/>");

    let mut widget = Widget::with_values([("name", "foo")]).unwrap();
    widget.add(&transport).await.unwrap();
    assert_eq!(widget.id().as_int(), Some(7));
    assert_eq!(widget.attr(Widget::COUNT).as_int(), Some(0));

    widget.set(Widget::NAME, "bar");
    widget.save(&transport).await.unwrap();
    assert_eq!(widget.attr(Widget::NAME).as_str(), Some("bar"));

    widget.delete(&transport).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);

    assert_eq!(calls[0].0, "/Test/Widget");
    assert_eq!(calls[0].1, Method::POST);
    assert_eq!(calls[0].2, Parameters::from([("name".to_string(), single("foo"))]));

    assert_eq!(calls[1].0, "/Test/Widget/7/");
    assert_eq!(calls[1].1, Method::PUT);
    assert_eq!(
        calls[1].2,
        Parameters::from([
            ("count".to_string(), single("0")),
            ("name".to_string(), single("bar")),
        ])
    );

    assert_eq!(calls[2].0, "/Test/Widget/7/");
    assert_eq!(calls[2].1, Method::DELETE);
    assert!(calls[2].2.is_empty());
}

#[tokio::test]
async fn test_second_create_is_duplicate() {
    let transport =
        Recorder::new().reply("<widget><id>7</id><name>x</name><count>0</count></widget>");
    let mut widget = Widget::with_values([("name", "x")]).unwrap();

    widget.add(&transport).await.unwrap();
    assert_eq!(widget.id().as_int(), Some(7));
    assert_eq!(widget.attr(Widget::NAME).as_str(), Some("x"));
    assert_eq!(widget.attr(Widget::COUNT).as_int(), Some(0));

    let err = widget.add(&transport).await.unwrap_err();
    assert!(matches!(
        err,
        KayakoError::DuplicateCreate { entity: "Widget", ref id } if id == "7"
    ));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_missing_required_field_makes_no_exchange() {
    let transport = Recorder::new();
    let mut widget = Widget::new();

    let err = widget.add(&transport).await.unwrap_err();

    assert!(matches!(
        err,
        KayakoError::MissingRequiredField { entity: "Widget", operation: "add", ref field }
            if field == "name"
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_save_without_required_field_makes_no_exchange() {
    let transport = Recorder::new();
    let mut widget = Widget::with_values([("id", 3i64), ("count", 5i64)]).unwrap();

    let err = widget.save(&transport).await.unwrap_err();

    assert!(matches!(
        err,
        KayakoError::MissingRequiredField { entity: "Widget", operation: "save", ref field }
            if field == "name"
    ));
    assert!(transport.calls().is_empty());
    assert_eq!(widget.attr(Widget::COUNT).as_int(), Some(5));
}

#[tokio::test]
async fn test_unset_attributes_are_never_sent() {
    let transport = Recorder::new().reply("<widget><id>1</id></widget>");
    let mut widget = Widget::with_values([("name", "foo")]).unwrap();

    widget.add(&transport).await.unwrap();

    let params = &transport.calls()[0].2;
    assert!(params.contains_key("name"));
    assert!(!params.contains_key("count"));
    assert!(!params.contains_key("id"));
}

#[tokio::test]
async fn test_null_is_sent_as_empty_value() {
    let transport = Recorder::new().reply("<widget><id>1</id><name>foo</name></widget>");
    let mut widget = Widget::new();
    widget.set(Widget::NAME, "foo").set(Widget::COUNT, Slot::Null);

    widget.add(&transport).await.unwrap();

    assert_eq!(transport.calls()[0].2["count"], single(""));
    assert!(widget.attr(Widget::COUNT).is_null());
}

#[tokio::test]
async fn test_null_counts_as_supplied_for_required_fields() {
    let transport = Recorder::new().reply("<widget><id>1</id></widget>");
    let mut widget = Widget::new();
    widget.set(Widget::NAME, Slot::Null);

    widget.add(&transport).await.unwrap();
    assert_eq!(transport.calls()[0].2["name"], single(""));
}

#[tokio::test]
async fn test_repeated_save_sends_identical_requests() {
    let transport = Recorder::new()
        .reply("<widget><id>3</id><name>foo</name><count>2</count></widget>")
        .reply("<widget><id>3</id><name>foo</name><count>2</count></widget>");
    let mut widget = Widget::with_values([
        ("id", Slot::from(3i64)),
        ("name", Slot::from("foo")),
        ("count", Slot::from(2i64)),
    ])
    .unwrap();
    let before = widget.clone();

    widget.save(&transport).await.unwrap();
    assert_eq!(widget, before);
    widget.save(&transport).await.unwrap();
    assert_eq!(widget, before);

    let calls = transport.calls();
    assert_eq!(calls[0], calls[1]);
}

#[tokio::test]
async fn test_get_not_found_is_none() {
    let transport = Recorder::new().not_found();
    let found = Widget::get(&transport, 99).await.unwrap();
    assert!(found.is_none());
    assert_eq!(transport.calls()[0].0, "/Test/Widget/99/");
}

#[tokio::test]
async fn test_get_without_entity_node_is_none() {
    let transport = Recorder::new().reply("<widgets/>");
    assert!(Widget::get(&transport, 99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_hydrates_observed_fields() {
    let transport =
        Recorder::new().reply("<widgets><widget><id>5</id><name>gear</name><count></count></widget></widgets>");
    let widget = Widget::get(&transport, 5).await.unwrap().unwrap();

    assert_eq!(widget.id().as_int(), Some(5));
    assert_eq!(widget.attr(Widget::NAME).as_str(), Some("gear"));
    assert!(widget.attr(Widget::COUNT).is_null());
    assert_eq!(widget.to_string(), "<Widget (5): gear>");
}

#[tokio::test]
async fn test_deleted_instance_keeps_identifier() {
    let transport = Recorder::new();
    let mut widget = Widget::with_values([("id", Slot::from(4i64)), ("name", Slot::from("x"))]).unwrap();

    widget.delete(&transport).await.unwrap();
    assert_eq!(widget.id().as_int(), Some(4));

    widget.delete(&transport).await.unwrap();
    assert_eq!(transport.calls().len(), 2);

    let err = widget.add(&transport).await.unwrap_err();
    assert!(matches!(
        err,
        KayakoError::DuplicateCreate { entity: "Widget", ref id } if id == "4"
    ));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_save_without_identifier_makes_no_exchange() {
    let transport = Recorder::new();
    let mut widget = Widget::with_values([("name", "foo")]).unwrap();

    assert!(matches!(
        widget.save(&transport).await,
        Err(KayakoError::Configuration(_))
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_delete_without_identifier_makes_no_exchange() {
    let transport = Recorder::new();
    let widget = Widget::with_values([("name", "foo")]).unwrap();

    assert!(matches!(
        widget.delete(&transport).await,
        Err(KayakoError::MissingIdentifier { field: "id", .. })
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_save_is_configuration_error() {
    let transport = Recorder::new();
    let mut part = Part::with_values([("id", 1i64), ("widgetid", 2i64)]).unwrap();

    assert!(matches!(
        part.save(&transport).await,
        Err(KayakoError::Configuration(_))
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_failed_exchange_leaves_instance_unchanged() {
    let transport = Recorder::new().reply("<widget><id>1</id><count>many</count></widget>");
    let mut widget = Widget::with_values([("name", "foo")]).unwrap();
    let before = widget.clone();

    let err = widget.add(&transport).await.unwrap_err();
    assert!(matches!(err, KayakoError::ResponseFormat { .. }));
    assert_eq!(widget, before);
}

#[tokio::test]
async fn test_get_all_preserves_order_and_adopts_parent() {
    let transport = Recorder::new().reply(
        "<parts>\
            <part><id>3</id><label>c</label></part>\
            <part><id>1</id><label>a</label><widgetid>8</widgetid></part>\
            <part><id>2</id><label>b</label></part>\
        </parts>",
    );

    let parts = Part::get_all(&transport, Scope::under(5i64)).await.unwrap();

    assert_eq!(transport.calls()[0].0, "/Test/Part/ListAll/5");
    let ids: Vec<_> = parts.iter().map(|p| p.id().as_int()).collect();
    assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    let parents: Vec<_> = parts.iter().map(|p| p.attr(Part::WIDGETID).as_int()).collect();
    assert_eq!(parents, vec![Some(5), Some(8), Some(5)]);
}

#[tokio::test]
async fn test_child_delete_routes_through_parent() {
    let transport = Recorder::new().reply("<parts><part><id>2</id></part></parts>");

    let part = Part::get(&transport, Key::within(5i64, 2i64)).await.unwrap().unwrap();
    assert_eq!(part.attr(Part::WIDGETID).as_int(), Some(5));
    part.delete(&transport).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls[0].0, "/Test/Part/5/2/");
    assert_eq!(calls[1].0, "/Test/Part/5/2/");
}

#[tokio::test]
async fn test_scope_parameters_are_sent_with_listing() {
    let transport = Recorder::new().reply("<widgets/>");
    let scope = Scope::new().page(10, 20).param("sort", "name");

    let widgets = Widget::get_all(&transport, scope).await.unwrap();

    assert!(widgets.is_empty());
    let (path, method, params) = &transport.calls()[0];
    assert_eq!(path, "/Test/Widget/ListAll/10/20");
    assert_eq!(*method, Method::GET);
    assert_eq!(params["sort"], single("name"));
}

#[test]
fn test_validation_without_runtime() {
    let transport = Recorder::new();
    let mut widget = Widget::with_values([("id", 1i64)]).unwrap();
    tokio_test::assert_err!(tokio_test::block_on(widget.add(&transport)));
    assert!(transport.calls().is_empty());
}
