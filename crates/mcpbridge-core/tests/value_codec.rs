//! Structured value codec tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use serde_json::json;

use mcpbridge_core::protocol::value::{
    decode, encode, Basis, Color, Quaternion, Rect2, Shape, Transform2D, Transform3D, Variant,
    Vector2, Vector3,
};

#[test]
fn vector2_survives_encode_then_decode() {
    let v = Variant::Vector2(Vector2 { x: 1.0, y: 2.0 });
    let json = encode(&v);
    assert_eq!(json, json!({"x": 1.0, "y": 2.0}));
    assert_eq!(decode(json, v.shape()), v);
}

#[test]
fn decode_dispatches_on_reference_shape_not_json() {
    let reference = Variant::Vector3(Vector3::default());
    let out = decode(json!({"x": 3, "y": 4}), reference.shape());
    assert_eq!(out, Variant::Vector3(Vector3 { x: 3.0, y: 4.0, z: 0.0 }));
}

#[test]
fn color_defaults_alpha_to_one() {
    let out = decode(json!({"r": 0.5}), Shape::Color);
    assert_eq!(out, Variant::Color(Color { r: 0.5, g: 0.0, b: 0.0, a: 1.0 }));
}

#[test]
fn missing_vector_components_default_to_zero() {
    let out = decode(json!({}), Shape::Vector2);
    assert_eq!(out, Variant::Vector2(Vector2 { x: 0.0, y: 0.0 }));
}

#[test]
fn non_matching_reference_is_identity() {
    let payload = json!({"x": 1, "label": "spawn", "tags": [1, 2.5, null, true]});
    let out = decode(payload.clone(), Shape::Other);
    assert_eq!(encode(&out), payload);
}

#[test]
fn scalar_against_vector_reference_passes_through() {
    let out = decode(json!("not a vector"), Shape::Vector2);
    assert_eq!(out, Variant::String("not a vector".into()));
    let out = decode(json!(42), Shape::Color);
    assert_eq!(out, Variant::Int(42));
}

#[test]
fn rect_has_no_decode_rule() {
    let rect = Variant::Rect2(Rect2 { x: 1.0, y: 2.0, w: 3.0, h: 4.0 });
    let json = encode(&rect);
    assert_eq!(json, json!({"x": 1.0, "y": 2.0, "w": 3.0, "h": 4.0}));
    assert_eq!(rect.shape(), Shape::Other);
    assert!(matches!(decode(json, rect.shape()), Variant::Dictionary(_)));
}

#[test]
fn transforms_encode_to_printed_form() {
    assert_eq!(
        encode(&Variant::Transform2D(Transform2D::default())),
        json!("[X: (1, 0), Y: (0, 1), O: (0, 0)]")
    );
    assert_eq!(
        encode(&Variant::Basis(Basis::default())),
        json!("[X: (1, 0, 0), Y: (0, 1, 0), Z: (0, 0, 1)]")
    );
    assert_eq!(
        encode(&Variant::Transform3D(Transform3D::default())),
        json!("[X: (1, 0, 0), Y: (0, 1, 0), Z: (0, 0, 1), O: (0, 0, 0)]")
    );
    assert_eq!(
        encode(&Variant::Quaternion(Quaternion { x: 0.0, y: 0.5, z: 0.0, w: 1.5 })),
        json!("(0, 0.5, 0, 1.5)")
    );
}

#[test]
fn nested_values_encode_element_wise() {
    let v = Variant::Array(vec![
        Variant::Vector2(Vector2 { x: 1.0, y: 1.0 }),
        Variant::Dictionary([("tint".to_string(), Variant::Color(Color::default()))].into()),
    ]);
    assert_eq!(
        encode(&v),
        json!([{"x": 1.0, "y": 1.0}, {"tint": {"r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0}}])
    );
}

#[test]
fn non_finite_float_encodes_as_null() {
    assert!(encode(&Variant::Float(f64::NAN)).is_null());
}
