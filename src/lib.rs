pub mod arena;
pub mod diagnostics;
pub mod dump;
pub mod error;
pub mod expr;
pub mod inputs;
pub mod limits;

pub use arena::{Arena, BinaryOp, Node, NodeId, NodeKind, UnaryOp};
pub use diagnostics::{Diagnostics, EvalWarning, LogDiagnostics};
pub use error::{ErrorKind, SkinError, SyntaxErrorKind};
pub use expr::eval::evaluate;
pub use expr::generate::generate;
pub use expr::parse_expression;
pub use inputs::{register_inputs, InputBindings, InputField, InputGroup};
pub use limits::Limits;

/// Parses `input` and returns its canonical text.
pub fn canonicalize(arena: &mut Arena, input: &str) -> Result<String, SkinError> {
    let root = parse_expression(arena, input)?;
    generate(arena, root)
}

/// Parses and evaluates `input` in one step, returning a copy of the result.
pub fn evaluate_expression(
    arena: &mut Arena,
    input: &str,
    diagnostics: &mut dyn Diagnostics,
) -> Result<Vec<f32>, SkinError> {
    let root = parse_expression(arena, input)?;
    evaluate(arena, root, diagnostics).map(<[f32]>::to_vec)
}

#[cfg(test)]
mod tests {
    use crate::{
        canonicalize, evaluate_expression, register_inputs, Arena, ErrorKind, EvalWarning,
        InputGroup,
    };

    #[test]
    fn canonicalizes_infix_input() {
        let mut arena = Arena::default();
        assert_eq!(canonicalize(&mut arena, "1 + 1").unwrap(), "_add(1,1)");
        assert_eq!(canonicalize(&mut arena, "((1))").unwrap(), "1");
    }

    #[test]
    fn evaluates_with_bound_inputs() {
        let mut arena = Arena::default();
        let bindings =
            register_inputs(&mut arena, &[InputGroup::new("example", &["x", "size"])]).unwrap();
        bindings.set(&mut arena, "example_x", &[1.0, 2.0, 3.0]).unwrap();
        bindings.set(&mut arena, "example_size", &[10.0]).unwrap();

        let mut warnings: Vec<EvalWarning> = Vec::new();
        let out =
            evaluate_expression(&mut arena, "example_x * example_size", &mut warnings).unwrap();
        assert_eq!(out, vec![10.0, 20.0, 30.0]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn parse_failures_are_classified() {
        let mut arena = Arena::default();
        let mut warnings: Vec<EvalWarning> = Vec::new();
        let err = evaluate_expression(&mut arena, "1 + missing_x", &mut warnings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);

        let err = evaluate_expression(&mut arena, "1 +", &mut warnings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
