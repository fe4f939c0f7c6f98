//! Structured editor values <-> JSON.
//!
//! Encoding is total and dispatches on the value's own variant. Decoding is
//! guided by a `Shape` taken from the value being replaced: the incoming JSON
//! is only reinterpreted when the shape asks for it, otherwise it converts
//! structurally (identity). Transform-like values encode to their printed
//! form and are never reconstructed.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// RGBA, components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect2 {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    pub x: Vector2,
    pub y: Vector2,
    pub origin: Vector2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            x: Vector2 { x: 1.0, y: 0.0 },
            y: Vector2 { x: 0.0, y: 1.0 },
            origin: Vector2::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub x: Vector3,
    pub y: Vector3,
    pub z: Vector3,
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            x: Vector3 { x: 1.0, y: 0.0, z: 0.0 },
            y: Vector3 { x: 0.0, y: 1.0, z: 0.0 },
            z: Vector3 { x: 0.0, y: 0.0, z: 1.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform3D {
    pub basis: Basis,
    pub origin: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Transform2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[X: {}, Y: {}, O: {}]", self.x, self.y, self.origin)
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[X: {}, Y: {}, Z: {}]", self.x, self.y, self.z)
    }
}

impl fmt::Display for Transform3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[X: {}, Y: {}, Z: {}, O: {}]",
            self.basis.x, self.basis.y, self.basis.z, self.origin
        )
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

/// A value as the editor holds it.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vector2(Vector2),
    Vector3(Vector3),
    Color(Color),
    Rect2(Rect2),
    Transform2D(Transform2D),
    Transform3D(Transform3D),
    Basis(Basis),
    Quaternion(Quaternion),
    Array(Vec<Variant>),
    Dictionary(BTreeMap<String, Variant>),
}

/// Reconstruction rule for `decode`, computed once from the value being
/// replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Vector2,
    Vector3,
    Color,
    /// No reinterpretation; JSON passes through structurally.
    Other,
}

impl Variant {
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Nil => "Nil",
            Variant::Bool(_) => "bool",
            Variant::Int(_) => "int",
            Variant::Float(_) => "float",
            Variant::String(_) => "String",
            Variant::Vector2(_) => "Vector2",
            Variant::Vector3(_) => "Vector3",
            Variant::Color(_) => "Color",
            Variant::Rect2(_) => "Rect2",
            Variant::Transform2D(_) => "Transform2D",
            Variant::Transform3D(_) => "Transform3D",
            Variant::Basis(_) => "Basis",
            Variant::Quaternion(_) => "Quaternion",
            Variant::Array(_) => "Array",
            Variant::Dictionary(_) => "Dictionary",
        }
    }

    /// Shape tag used to decode a replacement for this value.
    pub fn shape(&self) -> Shape {
        match self {
            Variant::Vector2(_) => Shape::Vector2,
            Variant::Vector3(_) => Shape::Vector3,
            Variant::Color(_) => Shape::Color,
            _ => Shape::Other,
        }
    }

    /// Structural conversion, no shape interpretation.
    pub fn from_json(json: Value) -> Variant {
        match json {
            Value::Null => Variant::Nil,
            Value::Bool(b) => Variant::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Variant::Int(i),
                None => Variant::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => Variant::String(s),
            Value::Array(items) => Variant::Array(items.into_iter().map(Variant::from_json).collect()),
            Value::Object(map) => Variant::Dictionary(
                map.into_iter()
                    .map(|(k, v)| (k, Variant::from_json(v)))
                    .collect(),
            ),
        }
    }
}

fn num(v: f64) -> Value {
    // Non-finite floats have no JSON form.
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn object<const N: usize>(fields: [(&str, f64); N]) -> Value {
    let mut m = Map::new();
    for (k, v) in fields {
        m.insert(k.to_string(), num(v));
    }
    Value::Object(m)
}

/// Encode an editor value to JSON.
///
/// Transform2D/Transform3D/Basis/Quaternion become their printed string and
/// cannot be decoded back.
pub fn encode(value: &Variant) -> Value {
    match value {
        Variant::Nil => Value::Null,
        Variant::Bool(b) => Value::Bool(*b),
        Variant::Int(i) => Value::from(*i),
        Variant::Float(f) => num(*f),
        Variant::String(s) => Value::String(s.clone()),
        Variant::Vector2(v) => object([("x", v.x), ("y", v.y)]),
        Variant::Vector3(v) => object([("x", v.x), ("y", v.y), ("z", v.z)]),
        Variant::Color(c) => object([("r", c.r), ("g", c.g), ("b", c.b), ("a", c.a)]),
        Variant::Rect2(r) => object([("x", r.x), ("y", r.y), ("w", r.w), ("h", r.h)]),
        Variant::Transform2D(t) => Value::String(t.to_string()),
        Variant::Transform3D(t) => Value::String(t.to_string()),
        Variant::Basis(b) => Value::String(b.to_string()),
        Variant::Quaternion(q) => Value::String(q.to_string()),
        Variant::Array(items) => Value::Array(items.iter().map(encode).collect()),
        Variant::Dictionary(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), encode(v)))
                .collect(),
        ),
    }
}

fn field(map: &Map<String, Value>, key: &str, default: f64) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(default)
}

/// Decode JSON against the shape of the value it will replace.
///
/// Only an object meeting a vector/color shape is reinterpreted; missing
/// components default to 0 (alpha to 1). Every other combination returns the
/// JSON unchanged, without coercion or error.
pub fn decode(json: Value, shape: Shape) -> Variant {
    let Value::Object(map) = json else {
        return Variant::from_json(json);
    };

    match shape {
        Shape::Vector2 => Variant::Vector2(Vector2 {
            x: field(&map, "x", 0.0),
            y: field(&map, "y", 0.0),
        }),
        Shape::Vector3 => Variant::Vector3(Vector3 {
            x: field(&map, "x", 0.0),
            y: field(&map, "y", 0.0),
            z: field(&map, "z", 0.0),
        }),
        Shape::Color => Variant::Color(Color {
            r: field(&map, "r", 0.0),
            g: field(&map, "g", 0.0),
            b: field(&map, "b", 0.0),
            a: field(&map, "a", 1.0),
        }),
        Shape::Other => Variant::from_json(Value::Object(map)),
    }
}
