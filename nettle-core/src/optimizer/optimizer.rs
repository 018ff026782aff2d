use std::rc::Rc;

use log::debug;

use crate::{
    lexer::prelude::Token,
    optimizer::prelude::{Problems, Warning},
    parser::prelude::{
        Block, ClassMember, Declaration, Expression, Infix, Primitive, Program, Statement
    },
    utils::prelude::SourceWarningEmitter
};

/// Post-order constant folder. Running it twice changes nothing the
/// first run did not.
#[derive(Debug, Default)]
pub struct Optimizer {
    problems: Problems,
    folded: usize,
}

impl Optimizer {
    /// Rewrites `program` in place and returns how many nodes were folded.
    pub fn optimize(program: &mut Program, warnings: &SourceWarningEmitter) -> usize {
        let mut optimizer = Optimizer::default();

        optimizer.optimize_statements(&mut program.statements);

        optimizer.problems.sort();

        for warning in optimizer.problems.take_warnings() {
            warnings.emit(warning);
        }

        debug!("optimizer folded {} node(s)", optimizer.folded);

        optimizer.folded
    }

    fn optimize_statements(&mut self, statements: &mut [Statement]) {
        for statement in statements.iter_mut() {
            self.optimize_statement(statement);
        }

        if let Some(idx) = statements.iter().position(Statement::is_jump) {
            if let (Some(first), Some(last)) = (statements.get(idx + 1), statements.last()) {
                self.problems.warning(Warning::UnreachableCode {
                    location: first.location().merge(last.location())
                });
            }
        }
    }

    fn optimize_block(&mut self, block: &mut Block) {
        self.optimize_statements(&mut block.statements);
    }

    fn optimize_declaration(&mut self, declaration: &mut Declaration) {
        for binding in declaration.bindings.iter_mut() {
            if let Some(value) = &mut binding.value {
                self.optimize_expression(value);
            }
        }
    }

    fn optimize_statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::Declaration(declaration) => self.optimize_declaration(declaration),
            Statement::Function(function) => self.optimize_block(Rc::make_mut(&mut function.body)),
            Statement::Class(class) => {
                for member in class.members.iter_mut() {
                    match member {
                        ClassMember::Field(field) => self.optimize_declaration(field),
                        ClassMember::Method(method) => self.optimize_block(Rc::make_mut(&mut method.body))
                    }
                }
            },
            Statement::Block(block) => self.optimize_block(block),
            Statement::If(conditional) => {
                self.optimize_expression(&mut conditional.condition);
                self.optimize_statement(&mut conditional.resolution);

                if let Some(alternative) = &mut conditional.alternative {
                    self.optimize_statement(alternative);
                }

                match (&conditional.condition, &conditional.alternative) {
                    (Expression::Primitive(Primitive::Bool { value: true, .. }), Some(alternative)) => {
                        self.problems.warning(Warning::UnreachableElseClause { location: alternative.location() })
                    },
                    (Expression::Primitive(Primitive::Bool { value: false, .. }), _) => {
                        self.problems.warning(Warning::UnreachableIfClause { location: conditional.resolution.location() })
                    },
                    _ => {}
                }
            },
            Statement::While(loop_) => {
                self.optimize_expression(&mut loop_.condition);
                self.optimize_statement(&mut loop_.body);
            },
            Statement::For(loop_) => {
                if let Some(initializer) = &mut loop_.initializer {
                    self.optimize_statement(initializer);
                }

                if let Some(condition) = &mut loop_.condition {
                    self.optimize_expression(condition);
                }

                if let Some(update) = &mut loop_.update {
                    self.optimize_expression(update);
                }

                self.optimize_statement(&mut loop_.body);
            },
            Statement::Switch(switch) => {
                self.optimize_expression(&mut switch.subject);

                for case in switch.cases.iter_mut() {
                    if let Some(value) = &mut case.value {
                        self.optimize_expression(value);
                    }

                    self.optimize_statement(&mut case.body);
                }
            },
            Statement::Return(ret) => {
                if let Some(value) = &mut ret.value {
                    self.optimize_expression(value);
                }
            },
            Statement::Throw(throw) => self.optimize_expression(&mut throw.value),
            Statement::Try(try_) => {
                self.optimize_block(&mut try_.body);

                if let Some(catch) = &mut try_.catch {
                    self.optimize_block(&mut catch.body);
                }

                if let Some(finally) = &mut try_.finally {
                    self.optimize_block(finally);
                }
            },
            Statement::Print(output) => {
                for value in output.values.iter_mut() {
                    self.optimize_expression(value);
                }
            },
            Statement::Expression(statement) => self.optimize_expression(&mut statement.expression),
            Statement::Break(_) | Statement::Continue(_) | Statement::Import(_) | Statement::Pass(_) => {}
        }
    }

    fn optimize_expression(&mut self, expression: &mut Expression) {
        match expression {
            Expression::Identifier(_) | Expression::Primitive(_) => {},
            Expression::Infix(infix) => {
                self.optimize_expression(&mut infix.left);
                self.optimize_expression(&mut infix.right);
            },
            Expression::Prefix(prefix) => self.optimize_expression(&mut prefix.expression),
            Expression::Ternary(ternary) => {
                self.optimize_expression(&mut ternary.condition);
                self.optimize_expression(&mut ternary.resolution);
                self.optimize_expression(&mut ternary.alternative);
            },
            Expression::Assignment(assignment) => self.optimize_expression(&mut assignment.value),
            Expression::Call(call) => {
                self.optimize_expression(&mut call.callee);

                for argument in call.arguments.iter_mut() {
                    self.optimize_expression(argument);
                }
            },
            Expression::Member(member) => self.optimize_expression(&mut member.object),
            Expression::Index(index) => {
                self.optimize_expression(&mut index.object);
                self.optimize_expression(&mut index.index);
            },
            Expression::List(list) => {
                for item in list.items.iter_mut() {
                    self.optimize_expression(item);
                }
            },
            Expression::Map(map) => {
                for entry in map.entries.iter_mut() {
                    self.optimize_expression(&mut entry.value);
                }
            },
            Expression::Lambda(lambda) => self.optimize_expression(Rc::make_mut(&mut lambda.body)),
            Expression::Input(input) => {
                if let Some(prompt) = &mut input.prompt {
                    self.optimize_expression(prompt);
                }
            },
            Expression::Nested { expression, .. } => self.optimize_expression(expression),
        }

        if let Some(folded) = self.fold(expression) {
            *expression = folded;
        }
    }

    fn fold(&mut self, expression: &Expression) -> Option<Expression> {
        match expression {
            Expression::Nested { expression, .. } => match expression.as_ref() {
                Expression::Primitive(primitive) => Some(Expression::Primitive(primitive.clone())),
                _ => None
            },
            Expression::Infix(infix) => self.fold_infix(infix),
            _ => None
        }
    }

    fn fold_infix(&mut self, infix: &Infix) -> Option<Expression> {
        if matches!(infix.operator, Token::Slash | Token::Percent) && is_zero(&infix.right) {
            self.problems.warning(Warning::DivisionByZero { location: infix.right.location() });
            return None;
        }

        let (
            Expression::Primitive(Primitive::Int { value: left, .. }),
            Expression::Primitive(Primitive::Int { value: right, .. })
        ) = (infix.left.as_ref(), infix.right.as_ref()) else {
            return None;
        };

        // overflow and inexact division stay for the interpreter
        let value = match infix.operator {
            Token::Plus => left.checked_add(*right),
            Token::Minus => left.checked_sub(*right),
            Token::Star => left.checked_mul(*right),
            Token::Slash if left.checked_rem(*right) == Some(0) => left.checked_div(*right),
            _ => None
        }?;

        debug!("folded `{infix}` into {value}");
        self.folded += 1;

        Some(Expression::Primitive(Primitive::Int { value, location: infix.location }))
    }
}

fn is_zero(expression: &Expression) -> bool {
    match expression {
        Expression::Primitive(Primitive::Int { value, .. }) => *value == 0,
        Expression::Primitive(Primitive::Float { value, .. }) => *value == 0.0,
        _ => false
    }
}
