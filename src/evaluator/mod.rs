pub mod literal;
pub mod operators;

use std::io::Write;
use std::rc::Rc;

use crate::ast::{Element, NodeKind, SyntaxNode};
use crate::error::RuntimeError;
use crate::runtime::environment;
use crate::runtime::number::parse_numeric_literal;
use crate::runtime::object::get_property;
use crate::runtime::{
    Callable, Completion, CompletionType, DeclarationKind, EnvRef, Environment, ExecutionContext,
    NativeFunction, Object, ObjectRef, PropertyDescriptor, Realm, Reference, ScriptFunction,
    Value,
};
use crate::scanner::token::{Keyword, Punctuator, Token, TokenKind};

/// Deepest nesting of script calls before evaluation fails.
pub const MAX_CALL_DEPTH: usize = 2_000;

/// Minimum stack left before growing (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack added per growth (1MB).
const STACK_PER_GROWTH: usize = 1024 * 1024;

/// Tree-walking evaluator. Holds the realm and the execution context stack;
/// one instance can evaluate many programs against the same global scope.
pub struct Evaluator {
    realm: Rc<Realm>,
    global: ExecutionContext,
    /// Contexts pushed above the global one by blocks and calls.
    contexts: Vec<ExecutionContext>,
    /// Script calls currently on the stack.
    call_depth: usize,
    output: Vec<String>,
    /// Writer for `log` output (allows testing without stdout)
    writer: Box<dyn Write>,
}

/// What evaluating one node produced.
enum Evaluation {
    Value(Value),
    Reference(Reference),
    Completion(Completion),
    Values(Vec<Value>),
    Names(Vec<String>),
    Properties(Vec<(String, Value)>),
}

impl Evaluation {
    /// GetValue: dereference a reference, pass a value through.
    fn into_value(self) -> Result<Value, RuntimeError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Reference(reference) => reference.get(),
            _ => Err(RuntimeError::malformed("expected an expression")),
        }
    }

    fn into_completion(self) -> Result<Completion, RuntimeError> {
        match self {
            Self::Completion(completion) => Ok(completion),
            _ => Err(RuntimeError::malformed("expected a statement")),
        }
    }

    fn into_values(self) -> Result<Vec<Value>, RuntimeError> {
        match self {
            Self::Values(values) => Ok(values),
            _ => Err(RuntimeError::malformed("expected an argument list")),
        }
    }

    fn into_names(self) -> Result<Vec<String>, RuntimeError> {
        match self {
            Self::Names(names) => Ok(names),
            _ => Err(RuntimeError::malformed("expected a parameter list")),
        }
    }

    fn into_properties(self) -> Result<Vec<(String, Value)>, RuntimeError> {
        match self {
            Self::Properties(properties) => Ok(properties),
            _ => Err(RuntimeError::malformed("expected a property list")),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    /// An evaluator whose `log` output goes to `writer`.
    pub fn with_writer(writer: impl Write + 'static) -> Self {
        let realm = Realm::new();
        let log = Object::function(
            Callable::Native(NativeFunction::Log),
            Some(realm.function_prototype.clone()),
        )
        .into_ref();
        realm.global_object.borrow_mut().define_own_property(
            NativeFunction::Log.name(),
            PropertyDescriptor::data(Value::Object(log)),
        );

        Self {
            global: ExecutionContext::global(realm.clone()),
            realm,
            contexts: Vec::new(),
            call_depth: 0,
            output: Vec::new(),
            writer: Box::new(writer),
        }
    }

    /// Evaluate a tree in the current global scope. Expression nodes produce
    /// a normal completion carrying their value. On error every context
    /// pushed during this evaluation has already been popped.
    pub fn evaluate(&mut self, node: &SyntaxNode) -> Result<Completion, RuntimeError> {
        let result = self.eval(node).and_then(|evaluation| match evaluation {
            Evaluation::Completion(completion) => Ok(completion),
            other => other.into_value().map(|value| Completion::normal(Some(value))),
        });
        self.contexts.clear();
        self.call_depth = 0;
        result
    }

    /// Lines written by `log`, in order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn global_object(&self) -> ObjectRef {
        self.realm.global_object.clone()
    }

    /// Number of live execution contexts, the global one included.
    pub fn context_depth(&self) -> usize {
        self.contexts.len() + 1
    }

    fn current(&self) -> &ExecutionContext {
        self.contexts.last().unwrap_or(&self.global)
    }

    fn lexical_environment(&self) -> EnvRef {
        self.current().lexical_environment.clone()
    }

    fn in_context<T>(
        &mut self,
        context: ExecutionContext,
        body: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.contexts.push(context);
        let result = body(self);
        self.contexts.pop();
        result
    }

    /// Evaluate any node. Chains of single-child wrappers are walked without
    /// recursing, and the stack is grown before descending further.
    fn eval(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        let node = skip_wrappers(node);
        ensure_sufficient_stack(|| self.dispatch(node))
    }

    fn dispatch(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        match node.kind {
            NodeKind::Program => self.eval_body(node.node(0)).map(Evaluation::Completion),
            NodeKind::StatementList => self.eval_statement_list(node).map(Evaluation::Completion),
            NodeKind::Statement | NodeKind::Expression | NodeKind::LeftHandSideExpression => Err(
                RuntimeError::malformed(format!("{} must wrap exactly one node", node.kind)),
            ),
            NodeKind::EmptyStatement => Ok(Evaluation::Completion(Completion::empty())),
            NodeKind::BreakStatement => Ok(Evaluation::Completion(Completion::breaking(
                jump_label(node),
            ))),
            NodeKind::ContinueStatement => Ok(Evaluation::Completion(Completion::continuing(
                jump_label(node),
            ))),
            NodeKind::ReturnStatement => self.eval_return(node).map(Evaluation::Completion),
            NodeKind::BlockStatement => self.eval_block(node).map(Evaluation::Completion),
            NodeKind::IfStatement => self.eval_if(node).map(Evaluation::Completion),
            NodeKind::WhileStatement => self.eval_while(node, None).map(Evaluation::Completion),
            NodeKind::LabelledStatement => self.eval_labelled(node).map(Evaluation::Completion),
            NodeKind::VariableDeclaration => self
                .declare_variable(node)
                .map(|()| Evaluation::Completion(Completion::empty())),
            NodeKind::FunctionDeclaration => self
                .declare_function(node)
                .map(|()| Evaluation::Completion(Completion::empty())),
            NodeKind::FormalParameterList => parameter_names(node).map(Evaluation::Names),
            NodeKind::FunctionBody => self.eval_body(node.node(1)).map(Evaluation::Completion),
            NodeKind::ExpressionStatement => self
                .eval_value(expect_node(node, 0)?)
                .map(|value| Evaluation::Completion(Completion::normal(Some(value)))),
            NodeKind::AssignmentExpression => self.eval_assignment(node),
            NodeKind::LogicalORExpression | NodeKind::LogicalANDExpression => {
                self.eval_logical(node)
            }
            NodeKind::EqualityExpression
            | NodeKind::RelationalExpression
            | NodeKind::AdditiveExpression
            | NodeKind::MultiplicativeExpression => self.eval_binary(node),
            NodeKind::UnaryExpression => self.eval_unary(node),
            NodeKind::CallExpression => self.eval_call_expression(node),
            NodeKind::NewExpression => self.eval_new(expect_node(node, 1)?, None),
            NodeKind::MemberExpression => self.eval_member_expression(node),
            NodeKind::PrimaryExpression => self.eval_primary(node),
            NodeKind::Literal => self.eval_literal(node).map(Evaluation::Value),
            NodeKind::ObjectLiteral => self.eval_object_literal(node).map(Evaluation::Value),
            NodeKind::PropertyList => self.eval_property_list(node).map(Evaluation::Properties),
            NodeKind::Property => self.eval_property(node).map(Evaluation::Properties),
            NodeKind::Arguments => match node.node(1) {
                Some(list) => self.eval(list),
                None => Ok(Evaluation::Values(Vec::new())),
            },
            NodeKind::ArgumentList => self.eval_argument_list(node).map(Evaluation::Values),
        }
    }

    fn eval_value(&mut self, node: &SyntaxNode) -> Result<Value, RuntimeError> {
        self.eval(node)?.into_value()
    }

    /// A program or function body: hoist, then run the statement list.
    fn eval_body(&mut self, list: Option<&SyntaxNode>) -> Result<Completion, RuntimeError> {
        let Some(list) = list else {
            return Ok(Completion::empty());
        };
        self.hoist_functions(list)?;
        self.eval_statement_list(list)
    }

    fn eval_return(&mut self, node: &SyntaxNode) -> Result<Completion, RuntimeError> {
        let value = match node.node(1) {
            Some(expression) => self.eval_value(expression)?,
            None => Value::Undefined,
        };
        Ok(Completion::returning(value))
    }

    /// Runs each statement in order, stopping at the first abrupt completion.
    /// The result carries the value of the last statement that produced one.
    fn eval_statement_list(&mut self, list: &SyntaxNode) -> Result<Completion, RuntimeError> {
        let mut last = None;
        for item in list_items(list) {
            let statement = element_node(item)?;
            if declares_function(statement) {
                continue;
            }
            let completion = self.eval(statement)?.into_completion()?;
            if completion.is_abrupt() {
                return Ok(completion.update_empty(last));
            }
            if completion.value.is_some() {
                last = completion.value;
            }
        }
        Ok(Completion::normal(last))
    }

    /// Instantiate the function declarations that sit directly in `list`
    /// before any of its statements run.
    fn hoist_functions(&mut self, list: &SyntaxNode) -> Result<(), RuntimeError> {
        for item in list_items(list) {
            let statement = element_node(item)?;
            if declares_function(statement) {
                self.declare_function(expect_node(statement, 0)?)?;
            }
        }
        Ok(())
    }

    fn eval_block(&mut self, node: &SyntaxNode) -> Result<Completion, RuntimeError> {
        let Some(list) = node.node(1) else {
            return Ok(Completion::empty());
        };
        let context = self.current().block();
        self.in_context(context, |evaluator| {
            evaluator.hoist_functions(list)?;
            evaluator.eval_statement_list(list)
        })
    }

    fn eval_if(&mut self, node: &SyntaxNode) -> Result<Completion, RuntimeError> {
        let condition = self.eval_value(expect_node(node, 2)?)?;
        let branch = if condition.to_boolean() {
            Some(expect_node(node, 4)?)
        } else {
            node.node(6)
        };
        let completion = match branch {
            Some(statement) => self.eval(statement)?.into_completion()?,
            None => Completion::empty(),
        };
        Ok(completion.update_empty(Some(Value::Undefined)))
    }

    fn eval_while(
        &mut self,
        node: &SyntaxNode,
        label: Option<&str>,
    ) -> Result<Completion, RuntimeError> {
        let condition = expect_node(node, 2)?;
        let body = expect_node(node, 4)?;
        let mut value = None;
        loop {
            if !self.eval_value(condition)?.to_boolean() {
                return Ok(Completion::normal(Some(value.unwrap_or(Value::Undefined))));
            }
            let completion = self.eval(body)?.into_completion()?;
            if completion.value.is_some() {
                value = completion.value.clone();
            }
            if !loop_continues(&completion, label) {
                if completion.kind == CompletionType::Break && completion.target.is_none() {
                    return Ok(Completion::normal(Some(value.unwrap_or(Value::Undefined))));
                }
                return Ok(completion.update_empty(value));
            }
        }
    }

    fn eval_labelled(&mut self, node: &SyntaxNode) -> Result<Completion, RuntimeError> {
        let label = expect_token(node, 0)?.lexeme.as_str();
        let completion = self.eval_while(expect_node(node, 2)?, Some(label))?;
        if completion.kind == CompletionType::Break && completion.target.as_deref() == Some(label)
        {
            return Ok(Completion::normal(Some(completion.value())));
        }
        Ok(completion)
    }

    fn declare_variable(&mut self, node: &SyntaxNode) -> Result<(), RuntimeError> {
        let kind = match expect_token(node, 0)?.kind {
            TokenKind::Keyword(Keyword::Var) => DeclarationKind::Var,
            TokenKind::Keyword(Keyword::Let) => DeclarationKind::Let,
            TokenKind::Keyword(Keyword::Const) => DeclarationKind::Const,
            other => {
                return Err(RuntimeError::malformed(format!(
                    "'{other}' does not start a declaration"
                )));
            }
        };
        let name = &expect_token(node, 1)?.lexeme;
        let env = match kind {
            DeclarationKind::Var => self.current().variable_environment.clone(),
            _ => self.lexical_environment(),
        };
        env.borrow_mut().declare(name, kind)
    }

    fn declare_function(&mut self, node: &SyntaxNode) -> Result<(), RuntimeError> {
        let name = expect_token(node, 1)?.lexeme.clone();
        let parameters = match node.node(3) {
            Some(list) => self.eval(list)?.into_names()?,
            None => Vec::new(),
        };
        let body = node
            .children
            .last()
            .and_then(Element::as_node)
            .ok_or_else(|| RuntimeError::malformed("function declaration has no body"))?;

        let scope = self.lexical_environment();
        let function = self.create_function(ScriptFunction {
            name: name.clone(),
            parameters,
            body: Rc::new(body.clone()),
            scope: scope.clone(),
        });
        let mut env = scope.borrow_mut();
        env.declare(&name, DeclarationKind::Function)?;
        env.initialize(&name, function);
        Ok(())
    }

    /// A function object with its own fresh `prototype` object, used as the
    /// prototype of instances it constructs.
    fn create_function(&self, function: ScriptFunction) -> Value {
        let prototype = Object::new(Some(self.realm.object_prototype.clone())).into_ref();
        let mut object = Object::function(
            Callable::Script(Rc::new(function)),
            Some(self.realm.function_prototype.clone()),
        );
        object.define_own_property("prototype", PropertyDescriptor::data(Value::Object(prototype)));
        Value::Object(object.into_ref())
    }

    fn eval_assignment(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        let Evaluation::Reference(target) = self.eval(expect_node(node, 0)?)? else {
            return Err(RuntimeError::InvalidAssignmentTarget);
        };
        let value = self.eval_value(expect_node(node, 2)?)?;
        target.set(value.clone())?;
        Ok(Evaluation::Value(value))
    }

    fn eval_logical(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        let left = self.eval_value(expect_node(node, 0)?)?;
        let settled = match node.kind {
            NodeKind::LogicalORExpression => left.to_boolean(),
            _ => !left.to_boolean(),
        };
        if settled {
            return Ok(Evaluation::Value(left));
        }
        self.eval_value(expect_node(node, 2)?).map(Evaluation::Value)
    }

    fn eval_binary(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        let left = self.eval_value(expect_node(node, 0)?)?;
        let op = punctuator(expect_token(node, 1)?)?;
        let right = self.eval_value(expect_node(node, 2)?)?;
        operators::binary(op, &left, &right).map(Evaluation::Value)
    }

    fn eval_unary(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        let op = punctuator(expect_token(node, 0)?)?;
        let operand = self.eval_value(expect_node(node, 1)?)?;
        operators::unary(op, &operand).map(Evaluation::Value)
    }

    fn eval_call_expression(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        match node.child(1) {
            Some(Element::Node(arguments)) => self.eval_call(expect_node(node, 0)?, arguments),
            _ => self.eval_property_access(node),
        }
    }

    fn eval_member_expression(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        if node.has_token(0, TokenKind::Keyword(Keyword::New)) {
            self.eval_new(expect_node(node, 1)?, Some(expect_node(node, 2)?))
        } else {
            self.eval_property_access(node)
        }
    }

    /// `base . name` and `base [ key ]` on either a MemberExpression or a
    /// CallExpression.
    fn eval_property_access(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        let base = self.eval_value(expect_node(node, 0)?)?;
        let name = match node.node(2) {
            Some(key) => self.eval_value(key)?.to_string(),
            None => expect_token(node, 2)?.lexeme.clone(),
        };
        Ok(Evaluation::Reference(Reference::property(base, name)))
    }

    fn eval_call(
        &mut self,
        callee: &SyntaxNode,
        arguments: &SyntaxNode,
    ) -> Result<Evaluation, RuntimeError> {
        let target = self.eval(callee)?;
        let this_value = match &target {
            Evaluation::Reference(reference) => reference.this_value(),
            _ => Value::Undefined,
        };
        let function = target.into_value()?;
        let args = self.eval(arguments)?.into_values()?;
        let Some(callable) = callable_of(&function) else {
            return Err(RuntimeError::NotCallable {
                callee: source_text(callee),
            });
        };
        self.call(&callable, this_value, args).map(Evaluation::Value)
    }

    /// `new C` and `new C(args)`. The instance inherits from `C.prototype`
    /// unless the constructor returns an object of its own.
    fn eval_new(
        &mut self,
        constructor: &SyntaxNode,
        arguments: Option<&SyntaxNode>,
    ) -> Result<Evaluation, RuntimeError> {
        let function = self.eval_value(constructor)?;
        let args = match arguments {
            Some(arguments) => self.eval(arguments)?.into_values()?,
            None => Vec::new(),
        };
        let (Some(Callable::Script(script)), Value::Object(object)) =
            (callable_of(&function), &function)
        else {
            return Err(RuntimeError::NotConstructor {
                callee: source_text(constructor),
            });
        };

        let prototype = match get_property(object, "prototype")? {
            Value::Object(prototype) => prototype,
            _ => self.realm.object_prototype.clone(),
        };
        let instance = Value::Object(Object::new(Some(prototype)).into_ref());
        let result = self.call_script(&script, instance.clone(), args)?;
        Ok(Evaluation::Value(match result {
            Value::Object(_) => result,
            _ => instance,
        }))
    }

    fn call(
        &mut self,
        callable: &Callable,
        this_value: Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match callable {
            Callable::Native(NativeFunction::Log) => {
                self.log(&args)?;
                Ok(Value::Undefined)
            }
            Callable::Script(function) => self.call_script(function, this_value, args),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %function.name))]
    fn call_script(
        &mut self,
        function: &Rc<ScriptFunction>,
        this_value: Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallStackExceeded {
                limit: MAX_CALL_DEPTH,
            });
        }
        let mut env = Environment::declarative(Some(function.scope.clone())).with_this(this_value);
        let mut args = args.into_iter();
        for parameter in &function.parameters {
            env.declare(parameter, DeclarationKind::Parameter)?;
            env.initialize(parameter, args.next().unwrap_or(Value::Undefined));
        }

        let context = ExecutionContext::function(self.realm.clone(), env.into_ref());
        let body = Rc::clone(&function.body);
        self.call_depth += 1;
        let completion =
            self.in_context(context, |evaluator| evaluator.eval(&body)?.into_completion());
        self.call_depth -= 1;
        let completion = completion?;
        match completion.kind {
            CompletionType::Return => Ok(completion.value()),
            CompletionType::Normal => Ok(Value::Undefined),
            CompletionType::Break | CompletionType::Continue => Err(escaped_jump(completion)),
        }
    }

    fn log(&mut self, args: &[Value]) -> Result<(), RuntimeError> {
        let line = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.writer, "{line}").map_err(|e| RuntimeError::Output {
            message: e.to_string(),
        })?;
        self.output.push(line);
        Ok(())
    }

    fn eval_primary(&mut self, node: &SyntaxNode) -> Result<Evaluation, RuntimeError> {
        if node.children.len() == 3 {
            return self.eval(expect_node(node, 1)?);
        }
        let token = expect_token(node, 0)?;
        match token.kind {
            TokenKind::Keyword(Keyword::This) => Ok(Evaluation::Value(environment::resolve_this(
                &self.lexical_environment(),
            ))),
            TokenKind::Identifier => self
                .resolve_identifier(&token.lexeme)
                .map(Evaluation::Reference),
            other => Err(RuntimeError::malformed(format!(
                "'{other}' is not a primary expression"
            ))),
        }
    }

    fn resolve_identifier(&self, name: &str) -> Result<Reference, RuntimeError> {
        Ok(match environment::resolve(&self.lexical_environment(), name)? {
            Some(scope) => Reference::binding(scope, name),
            None => Reference::unresolvable(name),
        })
    }

    fn eval_literal(&mut self, node: &SyntaxNode) -> Result<Value, RuntimeError> {
        let token = expect_token(node, 0)?;
        let value = match token.kind {
            TokenKind::NumericLiteral => Value::Number(parse_numeric_literal(&token.lexeme)?),
            TokenKind::StringLiteral => Value::string(literal::decode_string(&token.lexeme)),
            TokenKind::BooleanLiteral => Value::Boolean(token.lexeme == "true"),
            TokenKind::NullLiteral => Value::Null,
            other => {
                return Err(RuntimeError::malformed(format!("'{other}' is not a literal")));
            }
        };
        Ok(value)
    }

    fn eval_object_literal(&mut self, node: &SyntaxNode) -> Result<Value, RuntimeError> {
        let object = Object::new(Some(self.realm.object_prototype.clone())).into_ref();
        if let Some(list) = node.node(1) {
            for (key, value) in self.eval(list)?.into_properties()? {
                object
                    .borrow_mut()
                    .define_own_property(key, PropertyDescriptor::data(value));
            }
        }
        Ok(Value::Object(object))
    }

    fn eval_property_list(
        &mut self,
        node: &SyntaxNode,
    ) -> Result<Vec<(String, Value)>, RuntimeError> {
        let mut properties = Vec::new();
        for item in list_items(node) {
            properties.extend(self.eval(element_node(item)?)?.into_properties()?);
        }
        Ok(properties)
    }

    fn eval_property(&mut self, node: &SyntaxNode) -> Result<Vec<(String, Value)>, RuntimeError> {
        let key = expect_token(node, 0)?;
        let key = match key.kind {
            TokenKind::StringLiteral => literal::decode_string(&key.lexeme),
            _ => key.lexeme.clone(),
        };
        let value = self.eval_value(expect_node(node, 2)?)?;
        Ok(vec![(key, value)])
    }

    fn eval_argument_list(&mut self, node: &SyntaxNode) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::new();
        for item in list_items(node) {
            values.push(self.eval_value(element_node(item)?)?);
        }
        Ok(values)
    }
}

/// Grow the native stack before it runs low. Each script call descends
/// through several evaluator frames, so deep recursion would otherwise
/// overflow long before `MAX_CALL_DEPTH`.
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_GROWTH, f)
}

/// Follows chains of single-child nodes (statements, expressions and the
/// precedence levels) down to the node that does the work. Programs and
/// list nodes keep their meaning even with one child.
fn skip_wrappers(mut node: &SyntaxNode) -> &SyntaxNode {
    while let [Element::Node(inner)] = node.children.as_slice() {
        if !is_wrapper(node.kind) {
            break;
        }
        node = inner;
    }
    node
}

fn is_wrapper(kind: NodeKind) -> bool {
    !matches!(
        kind,
        NodeKind::Program
            | NodeKind::StatementList
            | NodeKind::FormalParameterList
            | NodeKind::PropertyList
            | NodeKind::ArgumentList
    )
}

fn parameter_names(node: &SyntaxNode) -> Result<Vec<String>, RuntimeError> {
    list_items(node)
        .into_iter()
        .map(|item| element_token(item).map(|token| token.lexeme.clone()))
        .collect()
}

fn callable_of(value: &Value) -> Option<Callable> {
    value
        .as_object()
        .and_then(|object| object.borrow().callable().cloned())
}

fn loop_continues(completion: &Completion, label: Option<&str>) -> bool {
    match completion.kind {
        CompletionType::Normal => true,
        CompletionType::Continue => {
            completion.target.is_none() || completion.target.as_deref() == label
        }
        CompletionType::Break | CompletionType::Return => false,
    }
}

/// A break or continue that reached a function boundary.
fn escaped_jump(completion: Completion) -> RuntimeError {
    match completion.target {
        Some(label) => RuntimeError::UndefinedLabel { label },
        None => RuntimeError::IllegalJump {
            statement: completion.kind.to_string(),
        },
    }
}

fn jump_label(node: &SyntaxNode) -> Option<String> {
    node.token(1)
        .filter(|token| token.kind == TokenKind::Identifier)
        .map(|token| token.lexeme.clone())
}

fn declares_function(statement: &SyntaxNode) -> bool {
    statement.kind == NodeKind::Statement
        && statement
            .node(0)
            .is_some_and(|inner| inner.kind == NodeKind::FunctionDeclaration)
}

/// Items of a left-recursive list node (`List := Item | List [sep] Item`),
/// in source order.
fn list_items(list: &SyntaxNode) -> Vec<&Element> {
    let mut items = Vec::new();
    let mut current = list;
    loop {
        match current.node(0) {
            Some(head) if head.kind == list.kind => {
                items.extend(current.children.last());
                current = head;
            }
            _ => {
                items.extend(current.children.first());
                break;
            }
        }
    }
    items.reverse();
    items
}

fn expect_node(node: &SyntaxNode, index: usize) -> Result<&SyntaxNode, RuntimeError> {
    node.node(index).ok_or_else(|| {
        RuntimeError::malformed(format!("{} has no node at position {index}", node.kind))
    })
}

fn expect_token(node: &SyntaxNode, index: usize) -> Result<&Token, RuntimeError> {
    node.token(index).ok_or_else(|| {
        RuntimeError::malformed(format!("{} has no token at position {index}", node.kind))
    })
}

fn element_node(element: &Element) -> Result<&SyntaxNode, RuntimeError> {
    element
        .as_node()
        .ok_or_else(|| RuntimeError::malformed("expected a node in list"))
}

fn element_token(element: &Element) -> Result<&Token, RuntimeError> {
    element
        .as_token()
        .ok_or_else(|| RuntimeError::malformed("expected a token in list"))
}

fn punctuator(token: &Token) -> Result<Punctuator, RuntimeError> {
    match token.kind {
        TokenKind::Punctuator(op) => Ok(op),
        other => Err(RuntimeError::malformed(format!(
            "'{other}' is not an operator"
        ))),
    }
}

/// Source text of an expression for error messages, rebuilt from its tokens.
fn source_text(node: &SyntaxNode) -> String {
    let mut text = String::new();
    let mut previous_is_word = false;
    for token in node.tokens() {
        let is_word = !matches!(token.kind, TokenKind::Punctuator(_));
        if is_word && previous_is_word {
            text.push(' ');
        }
        text.push_str(&token.lexeme);
        previous_is_word = is_word;
    }
    text
}
