//! Post-aggregations
//!
//! Arithmetic over aggregated fields, computed by the broker after
//! aggregation.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithmeticFn {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "quotient")]
    Quotient,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PostAggregation {
    Arithmetic {
        name: String,
        #[serde(rename = "fn")]
        function: ArithmeticFn,
        fields: Vec<PostAggregation>,
    },
    FieldAccess {
        name: String,
        field_name: String,
    },
    Constant {
        name: String,
        value: f64,
    },
}

impl PostAggregation {
    pub fn arithmetic(
        name: impl Into<String>,
        function: ArithmeticFn,
        fields: impl IntoIterator<Item = PostAggregation>,
    ) -> Self {
        Self::Arithmetic {
            name: name.into(),
            function,
            fields: fields.into_iter().collect(),
        }
    }

    /// Reads the aggregation named `field`
    pub fn field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::FieldAccess {
            name: field.clone(),
            field_name: field,
        }
    }

    pub fn constant(name: impl Into<String>, value: impl Into<f64>) -> Self {
        Self::Constant {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Arithmetic { name, .. }
            | Self::FieldAccess { name, .. }
            | Self::Constant { name, .. } => name,
        }
    }

    /// Fields read anywhere in the tree, first occurrence order, no repeats
    pub fn field_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    fn collect_field_names(&self, names: &mut Vec<String>) {
        match self {
            Self::Arithmetic { fields, .. } => {
                for field in fields {
                    field.collect_field_names(names);
                }
            }
            Self::FieldAccess { field_name, .. } => {
                if !names.contains(field_name) {
                    names.push(field_name.clone());
                }
            }
            Self::Constant { .. } => {}
        }
    }
}
