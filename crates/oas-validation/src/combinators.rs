//! `allOf` / `anyOf` / `oneOf` / `not` evaluation.
//!
//! Every branch is evaluated as a schema node of its own, so the nullable
//! gate and read/write filtering run per branch. A node carrying a
//! `discriminator` hands branch selection to
//! [`discriminator`](crate::discriminator) when the instance is an object.

use serde_json::{Map, Value};

use crate::discriminator;
use crate::error::{ValidationError, ValidationErrorKind, ValidationResult};
use crate::validator::Evaluation;

/// The schema combinators, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    AllOf,
    AnyOf,
    OneOf,
}

impl Combinator {
    pub const ALL: [Combinator; 3] = [Combinator::AllOf, Combinator::AnyOf, Combinator::OneOf];

    pub fn keyword(self) -> &'static str {
        match self {
            Combinator::AllOf => "allOf",
            Combinator::AnyOf => "anyOf",
            Combinator::OneOf => "oneOf",
        }
    }

    fn apply<'v>(
        self,
        ev: &mut Evaluation<'v>,
        branches: &'v [Value],
        instance: &Value,
    ) -> ValidationResult<()> {
        match self {
            // The first failing branch is reported as-is
            Combinator::AllOf => {
                for (index, branch) in branches.iter().enumerate() {
                    ev.with_schema_path(index.to_string(), |ev| ev.evaluate(branch, instance))?;
                }
                Ok(())
            }
            Combinator::AnyOf => {
                let mut errors = Vec::with_capacity(branches.len());
                for (index, branch) in branches.iter().enumerate() {
                    let outcome =
                        ev.with_schema_path(index.to_string(), |ev| ev.evaluate(branch, instance));
                    match outcome {
                        Ok(()) => return Ok(()),
                        Err(e) => errors.push(e),
                    }
                }
                Err(no_branch_matched(ev, instance, errors))
            }
            Combinator::OneOf => {
                let mut matched = Vec::new();
                let mut errors = Vec::new();
                for (index, branch) in branches.iter().enumerate() {
                    let outcome =
                        ev.with_schema_path(index.to_string(), |ev| ev.evaluate(branch, instance));
                    match outcome {
                        Ok(()) => matched.push(index),
                        Err(e) => errors.push(e),
                    }
                }
                match matched.len() {
                    1 => Ok(()),
                    0 => Err(no_branch_matched(ev, instance, errors)),
                    _ => Err(ev.error(ValidationErrorKind::MultipleBranchesMatched {
                        instance: instance.clone(),
                        matched,
                    })),
                }
            }
        }
    }
}

fn no_branch_matched(
    ev: &Evaluation<'_>,
    instance: &Value,
    errors: Vec<ValidationError>,
) -> ValidationError {
    ev.error(ValidationErrorKind::NoBranchMatched {
        instance: instance.clone(),
    })
    .with_context(errors)
}

/// Evaluate the combinator keywords of one schema node
pub(crate) fn evaluate<'v>(
    ev: &mut Evaluation<'v>,
    schema: &'v Map<String, Value>,
    instance: &Value,
) -> ValidationResult<()> {
    match schema.get("discriminator") {
        Some(raw) if instance.is_object() => {
            ev.with_schema_path("discriminator", |ev| discriminator::apply(ev, raw, instance))?;
        }
        _ => {
            for combinator in Combinator::ALL {
                let Some(branches) = schema.get(combinator.keyword()) else {
                    continue;
                };
                ev.with_schema_path(combinator.keyword(), |ev| match branches {
                    Value::Array(branches) => combinator.apply(ev, branches, instance),
                    _ => Err(ev.error(ValidationErrorKind::InvalidSchema {
                        message: format!("'{}' must be an array of schemas", combinator.keyword()),
                    })),
                })?;
            }
        }
    }

    if let Some(negated) = schema.get("not") {
        let accepted = ev.with_schema_path("not", |ev| ev.matches(negated, instance));
        if accepted {
            return Err(ev.with_schema_path("not", |ev| {
                ev.error(ValidationErrorKind::NotMatched {
                    instance: instance.clone(),
                    schema: negated.clone(),
                })
            }));
        }
    }

    Ok(())
}
