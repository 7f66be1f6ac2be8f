//! Calls into the compiled `Widget` bindings the way a script engine would.

use generated_bindings::widget::{Mode, Options, Widget, WidgetPrototype};
use webidl_bindgen::runtime::{ErrorType, Realm, Value};

fn setup() -> (Realm, Value) {
    let mut realm = Realm::new();
    let widget = realm.create_platform_object(&["Widget"]);
    (realm, Value::Object(widget))
}

// ============================================================================
// Dictionary members
// ============================================================================

#[test]
fn absent_members_stay_absent_through_a_round_trip() {
    let (mut realm, widget) = setup();
    let options = realm.create_object();
    realm.create_data_property(options, "size", Value::Number(3.0));

    let result = WidgetPrototype::echo(&mut realm, &widget, &[Value::Object(options)]).unwrap();

    let received = Widget::last_options().unwrap();
    assert_eq!(
        received,
        Options {
            mode: None,
            count: None,
            extra: None,
            label: None,
            size: 3,
            fit: Mode::Open,
        }
    );
    let object = result.as_object().unwrap();
    assert_eq!(realm.own_property_keys(object), ["size", "fit"]);
    assert_eq!(realm.get(object, "fit").unwrap(), Value::from("open"));
}

#[test]
fn explicit_null_is_kept_apart_from_absence() {
    let (mut realm, widget) = setup();
    let options = realm.create_object();
    realm.create_data_property(options, "size", Value::Number(1.0));
    realm.create_data_property(options, "label", Value::Null);
    realm.create_data_property(options, "mode", Value::from("closed"));
    realm.create_data_property(options, "count", Value::Undefined);
    realm.create_data_property(options, "extra", Value::Boolean(false));

    let result = WidgetPrototype::echo(&mut realm, &widget, &[Value::Object(options)]).unwrap();

    let received = Widget::last_options().unwrap();
    assert_eq!(received.label, Some(None));
    assert_eq!(received.mode, Some(Mode::Closed));
    assert_eq!(received.count, None);
    assert_eq!(received.extra, Some(Value::Boolean(false)));

    let object = result.as_object().unwrap();
    assert_eq!(realm.own_property_keys(object), ["mode", "extra", "label", "size", "fit"]);
    assert_eq!(realm.get(object, "label").unwrap(), Value::Null);
    assert_eq!(realm.get(object, "mode").unwrap(), Value::from("closed"));
}

#[test]
fn present_union_members_convert_their_value() {
    let (mut realm, widget) = setup();
    let options = realm.create_object();
    realm.create_data_property(options, "size", Value::Number(1.0));
    realm.create_data_property(options, "count", Value::Number(7.0));

    let result = WidgetPrototype::echo(&mut realm, &widget, &[Value::Object(options)]).unwrap();

    let object = result.as_object().unwrap();
    assert_eq!(realm.get(object, "count").unwrap(), Value::Number(7.0));
}

#[test]
fn missing_required_member_throws() {
    let (mut realm, widget) = setup();
    let options = realm.create_object();
    let err = WidgetPrototype::echo(&mut realm, &widget, &[Value::Object(options)]).unwrap_err();
    assert_eq!(err.kind(), ErrorType::MissingRequiredProperty);
}

#[test]
fn invalid_enum_member_throws() {
    let (mut realm, widget) = setup();
    let options = realm.create_object();
    realm.create_data_property(options, "size", Value::Number(1.0));
    realm.create_data_property(options, "mode", Value::from("ajar"));
    let err = WidgetPrototype::echo(&mut realm, &widget, &[Value::Object(options)]).unwrap_err();
    assert_eq!(err.kind(), ErrorType::InvalidEnumerationValue);
}

// ============================================================================
// Attributes and receivers
// ============================================================================

#[test]
fn enum_attribute_setter_ignores_unknown_values() {
    let (mut realm, widget) = setup();
    WidgetPrototype::mode_setter(&mut realm, &widget, &[Value::from("closed")]).unwrap();
    assert_eq!(WidgetPrototype::mode_getter(&mut realm, &widget, &[]).unwrap(), Value::from("closed"));

    WidgetPrototype::mode_setter(&mut realm, &widget, &[Value::from("ajar")]).unwrap();
    assert_eq!(WidgetPrototype::mode_getter(&mut realm, &widget, &[]).unwrap(), Value::from("closed"));
}

#[test]
fn wrong_receiver_is_rejected() {
    let (mut realm, _) = setup();
    let plain = realm.create_object();
    let err = WidgetPrototype::echo(&mut realm, &Value::Object(plain), &[Value::Undefined]).unwrap_err();
    assert_eq!(err.kind(), ErrorType::NotAnObjectOfType);
}
