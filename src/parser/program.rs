use super::expression::Expression;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    statements: Vec<Expression>,
}

impl Program {
    pub fn new(statements: Vec<Expression>) -> Self {
        Self { statements }
    }

    pub fn statements(&self) -> &[Expression] {
        &self.statements
    }

    pub fn get_statement(&self, index: usize) -> Option<&Expression> {
        self.statements.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
