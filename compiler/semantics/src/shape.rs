//! Shape classification of method signature types.

use ir::TypeExpr;

/// The signature shapes the forward mapper understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizedShape<'a> {
    /// A built-in scalar (`string`, `int`, ...)
    Scalar(&'a str),
    /// A user-declared named type
    NamedReference(&'a str),
    /// `stream<T>`; carries `T`
    StreamOf(&'a TypeExpr),
    /// Anything else (arrays, optionals, unions)
    Unrecognized(&'a TypeExpr),
}

/// Classify a type expression.
pub fn classify(expr: &TypeExpr) -> RecognizedShape<'_> {
    match expr {
        TypeExpr::Builtin(name) => RecognizedShape::Scalar(name),
        TypeExpr::Named(name) => RecognizedShape::NamedReference(name),
        TypeExpr::Stream(inner) => RecognizedShape::StreamOf(inner),
        other => RecognizedShape::Unrecognized(other),
    }
}
