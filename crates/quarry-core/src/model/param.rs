use crate::{
    query::{Constraint, Operator},
    validate::{Predicate, ValidatorRegistry},
    value::Value,
};

///
/// Param
///
/// Adapter-side definition of a queryable parameter. Constraints on its path
/// are checked against the allowed operators and the declared checks before
/// the query is dispatched.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: String,
    pub operators: Vec<Operator>,
    pub checks: Vec<(String, Value)>,
    pub aliases: Vec<String>,
}

impl Param {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: "string".to_string(),
            operators: Vec::new(),
            checks: Vec::new(),
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Allow an operator. With no operators declared, any operator passes.
    #[must_use]
    pub fn operator(mut self, operator: impl Into<Operator>) -> Self {
        self.operators.push(operator.into());
        self
    }

    /// Add a check resolved through the `param.` validator namespace.
    #[must_use]
    pub fn validate(mut self, validator: impl Into<String>, arg: impl Into<Value>) -> Self {
        self.checks.push((validator.into(), arg.into()));
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Declared name or one of its aliases.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Resolve checks against `registry` once, for repeated evaluation.
    #[must_use]
    pub fn compile(&self, registry: &ValidatorRegistry) -> ParamChecks {
        let checks = self
            .checks
            .iter()
            .map(|(name, arg)| (registry.lookup_in("param", name), arg.clone()))
            .collect();

        ParamChecks {
            operators: self.operators.clone(),
            checks,
        }
    }
}

///
/// ParamChecks
///

#[derive(Clone)]
pub struct ParamChecks {
    operators: Vec<Operator>,
    checks: Vec<(Option<Predicate>, Value)>,
}

impl ParamChecks {
    /// Messages for everything `constraint` violates. Unknown validators
    /// count as failures.
    #[must_use]
    pub fn issues(&self, constraint: &Constraint) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.operators.is_empty() && !self.operators.contains(&constraint.operator) {
            issues.push(format!("Invalid operator {}", constraint.operator));
        }

        for (predicate, arg) in &self.checks {
            let passed = predicate
                .as_ref()
                .is_some_and(|p| p(&constraint.right.value, arg));

            if !passed {
                issues.push(format!("Invalid constraint: {}", constraint.left.path));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathResolver;

    fn constraint(operator: Operator, value: impl Into<Value>) -> Constraint {
        let left = PathResolver::default()
            .resolve("user.age", None)
            .expect("path should resolve");

        Constraint::new(left, operator, value)
    }

    #[test]
    fn answers_to_name_and_aliases() {
        let param = Param::new("age").alias("years");

        assert!(param.answers_to("age"));
        assert!(param.answers_to("years"));
        assert!(!param.answers_to("email"));
    }

    #[test]
    fn undeclared_operator_is_reported() {
        let registry = ValidatorRegistry::with_builtins();
        let checks = Param::new("age")
            .operator("gte")
            .operator("lte")
            .compile(&registry);

        assert!(checks.issues(&constraint(Operator::Gte, 18)).is_empty());
        assert_eq!(
            checks.issues(&constraint(Operator::Match, "1")),
            vec!["Invalid operator match".to_string()]
        );
    }

    #[test]
    fn failing_check_reports_path() {
        let registry = ValidatorRegistry::with_builtins();
        let checks = Param::new("age")
            .type_name("integer")
            .validate("gte", 0)
            .compile(&registry);

        assert!(checks.issues(&constraint(Operator::Eq, 3)).is_empty());
        assert_eq!(
            checks.issues(&constraint(Operator::Eq, -3)),
            vec!["Invalid constraint: user.age".to_string()]
        );
    }

    #[test]
    fn present_check_rejects_null_operand() {
        let registry = ValidatorRegistry::with_builtins();
        let checks = Param::new("age").validate("present", Value::Null).compile(&registry);

        assert_eq!(checks.issues(&constraint(Operator::Eq, Value::Null)).len(), 1);
        assert!(checks.issues(&constraint(Operator::Eq, 1)).is_empty());
    }

    #[test]
    fn unknown_validator_counts_as_failure() {
        let registry = ValidatorRegistry::with_builtins();
        let checks = Param::new("age").validate("prime", Value::Null).compile(&registry);

        assert_eq!(checks.issues(&constraint(Operator::Eq, 7)).len(), 1);
    }
}
