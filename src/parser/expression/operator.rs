use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Not,
}

impl UnaryOperator {
    pub fn get_binding_power(&self) -> u8 {
        match self {
            // Logical negation sits between the boolean tests and comparisons.
            UnaryOperator::Not => 7,
            UnaryOperator::Minus => 15,
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Minus => write!(f, "-"),
            UnaryOperator::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
    And,
    Or,
    Index,
}

impl BinaryOperator {
    pub fn get_binding_power(&self) -> (u8, u8) {
        match self {
            // 1. Indexing
            Self::Index => (17, 18),
            // 2. Multiplicative operators
            Self::Multiply | Self::Divide | Self::Modulo => (13, 14),
            // 3. Additive operators
            Self::Add | Self::Subtract => (11, 12),
            // 4. Comparison operators
            Self::Equal
            | Self::GreaterThan
            | Self::LessThan
            | Self::GreaterThanEqual
            | Self::LessThanEqual => (9, 10),
            // 5. Boolean tests
            Self::And => (5, 6),
            Self::Or => (3, 4),
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::GreaterThan
                | Self::LessThan
                | Self::GreaterThanEqual
                | Self::LessThanEqual
        )
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Sub",
            Self::Multiply => "Mul",
            Self::Divide => "Div",
            Self::Modulo => "Mod",
            Self::Equal => "Equal",
            Self::GreaterThan => "Greater",
            Self::LessThan => "Less",
            Self::GreaterThanEqual => "GreaterEqual",
            Self::LessThanEqual => "LessEqual",
            Self::And => "And",
            Self::Or => "Or",
            Self::Index => "Indexing",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterThanEqual => ">=",
            Self::LessThanEqual => "<=",
            Self::And => "and",
            Self::Or => "or",
            Self::Index => "_",
        };
        write!(f, "{symbol}")
    }
}
