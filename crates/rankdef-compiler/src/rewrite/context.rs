//! Function serialization context.
//!
//! One context lives for the compilation of one profile. Every function that
//! is reachable from a phase expression, a declared feature or a model input
//! goes through it, so each function (or bound instance of a function) is
//! serialized exactly once no matter how often it is referenced.

use indexmap::IndexMap;
use rankdef_core::{AttributeFields, ConstantDef, ValueType};

use crate::expr::{Expr, Lambda, Reference, TensorBody, TensorExpr, TensorValue};
use crate::profile::{CompiledRankProfile, RankingFunction};
use crate::registry::QueryProfileRegistry;
use crate::{Error, Result};

type Bindings = IndexMap<String, Expr>;

/// Read-only inputs used to infer expression types.
#[derive(Clone, Copy)]
pub struct TypeEnv<'a> {
    pub attributes: &'a AttributeFields,
    pub query_profiles: &'a dyn QueryProfileRegistry,
    pub schema_constants: &'a [ConstantDef],
}

/// A function as it is emitted: the rewritten body and its types.
#[derive(Clone, Debug, PartialEq)]
pub struct SerializedFunction {
    pub name: String,
    pub script: String,
    /// Declared parameters with their types. Empty for bound instances.
    pub arguments: Vec<(String, ValueType)>,
    pub return_type: ValueType,
}

pub struct SerializationContext<'a> {
    profile: &'a CompiledRankProfile,
    env: TypeEnv<'a>,
    serialized: IndexMap<String, SerializedFunction>,
    /// Functions currently being expanded, outermost first.
    stack: Vec<String>,
}

impl<'a> SerializationContext<'a> {
    pub fn new(profile: &'a CompiledRankProfile, env: TypeEnv<'a>) -> Self {
        Self {
            profile,
            env,
            serialized: IndexMap::new(),
            stack: Vec::new(),
        }
    }

    /// Serialized functions in registration order. Dependencies of a function
    /// are registered before it.
    pub fn functions(&self) -> &IndexMap<String, SerializedFunction> {
        &self.serialized
    }

    pub fn into_functions(self) -> IndexMap<String, SerializedFunction> {
        self.serialized
    }

    pub fn is_serialized(&self, name: &str) -> bool {
        self.serialized.contains_key(name)
    }

    /// Rewrite an expression: inline functions, bind arguments, rename
    /// backend features, and register every function reached on the way.
    pub fn rewrite(&mut self, expr: &Expr) -> Result<Expr> {
        self.rewrite_with(expr, &Bindings::new())
    }

    /// Rewrite a reference that must stay a named feature: user functions are
    /// serialized out of line even when declared inline.
    pub fn feature_reference(&mut self, reference: &Reference) -> Result<Expr> {
        let bindings = Bindings::new();
        let args = self.rewrite_args(reference, &bindings)?;
        let profile = self.profile;
        match profile.function(&reference.name) {
            Some(function) => {
                let name = self.out_of_line(function, args)?;
                Ok(expression_ref(name, reference))
            }
            None => Ok(Expr::Ref(Reference {
                name: backend_feature_name(&reference.name).to_string(),
                args,
                call: reference.call,
                output: reference.output.clone(),
            })),
        }
    }

    /// Serialize `function` under its own name with its parameters unbound.
    pub fn serialize_function(&mut self, function: &RankingFunction) -> Result<()> {
        if self.is_serialized(function.name()) {
            return Ok(());
        }
        self.enter(function.name())?;
        let identity: Bindings = function
            .parameters()
            .map(|p| (p.to_string(), Expr::ident(p)))
            .collect();
        let body = self.rewrite_with(&function.body, &identity);
        self.stack.pop();
        let body = body?;

        let arguments: Vec<(String, ValueType)> = function
            .def
            .arguments
            .iter()
            .map(|a| (a.name.clone(), a.value_type.clone().unwrap_or_default()))
            .collect();
        let locals: IndexMap<String, ValueType> = arguments.iter().cloned().collect();
        let return_type = match &function.def.return_type {
            Some(declared) => declared.clone(),
            None => self.resolve_type(&body, &locals),
        };
        self.register(SerializedFunction {
            name: function.name().to_string(),
            script: body.to_string(),
            arguments,
            return_type,
        });
        Ok(())
    }

    fn register(&mut self, function: SerializedFunction) {
        self.serialized.insert(function.name.clone(), function);
    }

    fn enter(&mut self, name: &str) -> Result<()> {
        if let Some(start) = self.stack.iter().position(|n| n == name) {
            let mut chain = self.stack[start..].to_vec();
            chain.push(name.to_string());
            return Err(Error::RecursiveFunction {
                function: name.to_string(),
                chain,
            });
        }
        self.stack.push(name.to_string());
        Ok(())
    }

    fn rewrite_with(&mut self, expr: &Expr, bindings: &Bindings) -> Result<Expr> {
        Ok(match expr {
            Expr::Number(_) | Expr::Str(_) => expr.clone(),
            Expr::Group(inner) => Expr::Group(Box::new(self.rewrite_with(inner, bindings)?)),
            Expr::Unary(op, operand) => {
                Expr::Unary(*op, Box::new(self.rewrite_with(operand, bindings)?))
            }
            Expr::Binary(op, left, right) => Expr::Binary(
                *op,
                Box::new(self.rewrite_with(left, bindings)?),
                Box::new(self.rewrite_with(right, bindings)?),
            ),
            Expr::Ref(reference) => self.rewrite_reference(reference, bindings)?,
            Expr::Lambda(lambda) => {
                let scope = scoped(bindings, &lambda.params);
                Expr::Lambda(Lambda {
                    params: lambda.params.clone(),
                    body: Box::new(self.rewrite_with(&lambda.body, &scope)?),
                })
            }
            Expr::Tensor(tensor) => Expr::Tensor(self.rewrite_tensor(tensor, bindings)?),
        })
    }

    fn rewrite_tensor(&mut self, tensor: &TensorExpr, bindings: &Bindings) -> Result<TensorExpr> {
        let body = match &tensor.body {
            TensorBody::Literal(value) => {
                TensorBody::Literal(self.rewrite_tensor_value(value, bindings)?)
            }
            TensorBody::Generate(body) => {
                let scope = scoped(bindings, &tensor.tensor_type.dimensions);
                TensorBody::Generate(Box::new(self.rewrite_with(body, &scope)?))
            }
        };
        Ok(TensorExpr {
            tensor_type: tensor.tensor_type.clone(),
            body,
        })
    }

    fn rewrite_tensor_value(
        &mut self,
        value: &TensorValue,
        bindings: &Bindings,
    ) -> Result<TensorValue> {
        Ok(match value {
            TensorValue::Cell(expr) => TensorValue::Cell(Box::new(self.rewrite_with(expr, bindings)?)),
            TensorValue::Dense(cells) => TensorValue::Dense(
                cells
                    .iter()
                    .map(|cell| self.rewrite_tensor_value(cell, bindings))
                    .collect::<Result<_>>()?,
            ),
            TensorValue::Mapped(cells) => TensorValue::Mapped(
                cells
                    .iter()
                    .map(|(address, cell)| {
                        Ok((address.clone(), self.rewrite_tensor_value(cell, bindings)?))
                    })
                    .collect::<Result<_>>()?,
            ),
        })
    }

    fn rewrite_args(&mut self, reference: &Reference, bindings: &Bindings) -> Result<Vec<Expr>> {
        reference
            .args
            .iter()
            .map(|arg| self.rewrite_with(arg, bindings))
            .collect()
    }

    fn rewrite_reference(&mut self, reference: &Reference, bindings: &Bindings) -> Result<Expr> {
        if reference.is_identifier()
            && let Some(bound) = bindings.get(&reference.name)
        {
            return Ok(bound.clone());
        }

        let args = self.rewrite_args(reference, bindings)?;
        let profile = self.profile;
        let Some(function) = profile.function(&reference.name) else {
            return Ok(Expr::Ref(Reference {
                name: backend_feature_name(&reference.name).to_string(),
                args,
                call: reference.call,
                output: reference.output.clone(),
            }));
        };

        if function.def.inline {
            return Ok(self.inline(function, args)?.grouped());
        }
        let name = self.out_of_line(function, args)?;
        Ok(expression_ref(name, reference))
    }

    fn check_arity(function: &RankingFunction, args: &[Expr]) -> Result<()> {
        let expected = function.def.arguments.len();
        if args.len() != expected {
            return Err(Error::FunctionArity {
                function: function.name().to_string(),
                expected,
                found: args.len(),
            });
        }
        Ok(())
    }

    fn bind(function: &RankingFunction, args: Vec<Expr>) -> Bindings {
        function.parameters().map(str::to_string).zip(args).collect()
    }

    fn inline(&mut self, function: &RankingFunction, args: Vec<Expr>) -> Result<Expr> {
        Self::check_arity(function, &args)?;
        self.enter(function.name())?;
        let body = self.rewrite_with(&function.body, &Self::bind(function, args));
        self.stack.pop();
        body
    }

    /// Serialize `function` (bound to `args` if it has parameters) and return
    /// the name the backend knows it by.
    fn out_of_line(&mut self, function: &RankingFunction, args: Vec<Expr>) -> Result<String> {
        Self::check_arity(function, &args)?;
        if args.is_empty() {
            self.serialize_function(function)?;
            return Ok(function.name().to_string());
        }

        let bound_text = args
            .iter()
            .map(Expr::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let instance = format!("{}@{:08x}", function.name(), crc32fast::hash(bound_text.as_bytes()));
        if self.is_serialized(&instance) {
            return Ok(instance);
        }

        self.enter(function.name())?;
        let body = self.rewrite_with(&function.body, &Self::bind(function, args));
        self.stack.pop();
        let body = body?;

        let return_type = match &function.def.return_type {
            Some(declared) => declared.clone(),
            None => self.resolve_type(&body, &IndexMap::new()),
        };
        self.register(SerializedFunction {
            name: instance.clone(),
            script: body.to_string(),
            arguments: Vec::new(),
            return_type,
        });
        Ok(instance)
    }

    /// Infer the value type of a rewritten expression.
    ///
    /// Comparisons and logic yield `double`; arithmetic yields the first
    /// operand type that is not `double`.
    pub fn resolve_type(&self, expr: &Expr, locals: &IndexMap<String, ValueType>) -> ValueType {
        match expr {
            Expr::Number(_) | Expr::Str(_) => ValueType::double(),
            Expr::Group(inner) | Expr::Unary(_, inner) => self.resolve_type(inner, locals),
            Expr::Binary(op, left, right) => {
                if op.is_boolean() {
                    return ValueType::double();
                }
                let left = self.resolve_type(left, locals);
                if !left.is_double() {
                    return left;
                }
                self.resolve_type(right, locals)
            }
            Expr::Ref(reference) => self.reference_type(reference, locals),
            Expr::Lambda(_) => ValueType::double(),
            Expr::Tensor(tensor) => ValueType::new(&tensor.tensor_type.text),
        }
    }

    fn reference_type(
        &self,
        reference: &Reference,
        locals: &IndexMap<String, ValueType>,
    ) -> ValueType {
        if reference.output.is_some() {
            return ValueType::double();
        }
        if reference.is_identifier()
            && let Some(local) = locals.get(&reference.name)
        {
            return local.clone();
        }

        let found = match (reference.name.as_str(), reference.single_name_arg()) {
            ("query", Some(input)) => self
                .profile
                .inputs
                .get(input)
                .map(|i| i.value_type.clone())
                .or_else(|| self.env.query_profiles.feature_type(input)),
            ("attribute", Some(field)) => self.env.attributes.attribute_type(field).cloned(),
            ("constant", Some(name)) => self
                .profile
                .constants
                .get(name)
                .or_else(|| self.env.schema_constants.iter().find(|c| c.name == name))
                .map(|c| c.value_type.clone()),
            ("expressionRef", Some(name)) => {
                self.serialized.get(name).map(|f| f.return_type.clone())
            }
            (name, _) => self
                .profile
                .function(name)
                .and_then(|f| f.def.return_type.clone()),
        };
        found.filter(|t| !t.is_scalar()).unwrap_or_default()
    }
}

/// `bindings` with `names` bound to themselves, so lambda parameters and
/// tensor dimensions shadow outer arguments and functions of the same name.
fn scoped(bindings: &Bindings, names: &[String]) -> Bindings {
    let mut scope = bindings.clone();
    for name in names {
        scope.insert(name.clone(), Expr::ident(name.as_str()));
    }
    scope
}

fn expression_ref(name: String, original: &Reference) -> Expr {
    Expr::Ref(Reference {
        output: original.output.clone(),
        ..Reference::call("expressionRef", vec![Expr::ident(name)])
    })
}

/// Feature names the backend spells differently from the schema language.
pub fn backend_feature_name(name: &str) -> &str {
    match name {
        "onnxModel" => "onnx",
        other => other,
    }
}
