use conformc_conformance::Checker;
use conformc_declaration::{
    declare,
    entity::{OperationRef, StructConvention},
    input::{
        CallDeclaration, ImplementationDeclaration,
        MaterializationDeclaration, SignatureDeclaration, StructDeclaration,
        TypeName,
    },
    signature::Kind,
    Model,
};
use conformc_diagnostic::Report;
use conformc_handler::Panic;

use crate::{
    diagnostic::{Error, NoMaterializationPath, NonInlinableOperation},
    input::TransitionDeclaration,
    value::{
        Domain, Expression, Literal, RuntimeValue, TransitionContext, Value,
    },
    Resolver,
};

fn restricted(
    name: &str,
    target: &str,
    implementations: Vec<ImplementationDeclaration>,
) -> StructDeclaration {
    StructDeclaration {
        name: name.to_owned(),
        implementations,
        materialization: Some(MaterializationDeclaration {
            restricted: true,
            target: Some(target.to_owned()),
        }),
        ..StructDeclaration::default()
    }
}

fn runtime(
    name: &str,
    implementations: Vec<ImplementationDeclaration>,
) -> StructDeclaration {
    StructDeclaration {
        name: name.to_owned(),
        convention: StructConvention::RegisterPassable,
        implementations,
        ..StructDeclaration::default()
    }
}

fn converting_from(name: &str) -> ImplementationDeclaration {
    SignatureDeclaration::register_lifecycle(Kind::Constructor, vec![
        TypeName::named(name),
    ])
    .into()
}

/// - `IntLiteral` materializes into `Int`, which can be built from it.
/// - `IntLiteral.debug` reaches `Int.print`, which is not always-inline.
/// - `FloatLiteral` materializes into `Float`, which has no constructor.
/// - `BoolLiteral` materializes into `Boolean`, which has two.
fn model() -> Model {
    let this = || TypeName::This;

    let int_literal = restricted("IntLiteral", "Int", vec![
        ImplementationDeclaration::from(SignatureDeclaration::static_method(
            "zero",
            Vec::new(),
            this(),
        ))
        .inline(),
        ImplementationDeclaration::from(SignatureDeclaration::method(
            "add",
            vec![this()],
            this(),
        ))
        .inline(),
        ImplementationDeclaration {
            signature: SignatureDeclaration::method(
                "debug",
                Vec::new(),
                TypeName::Unit,
            ),
            always_inline: true,
            calls: vec![CallDeclaration {
                struct_name: "Int".to_owned(),
                kind: Kind::InstanceMethod,
                name: "print".to_owned(),
            }],
        },
    ]);
    let int = runtime("Int", vec![
        converting_from("IntLiteral"),
        SignatureDeclaration::method("print", Vec::new(), TypeName::Unit)
            .into(),
    ]);

    let float_literal = restricted("FloatLiteral", "Float", Vec::new());
    let float = runtime("Float", Vec::new());

    let bool_literal = restricted("BoolLiteral", "Boolean", Vec::new());
    let boolean = runtime("Boolean", vec![
        converting_from("BoolLiteral"),
        converting_from("BoolLiteral"),
    ]);

    declare(
        Vec::new(),
        vec![int_literal, int, float_literal, float, bool_literal, boolean],
        &Panic,
    )
    .unwrap()
}

fn call(
    model: &Model,
    struct_name: &str,
    kind: Kind,
    name: &str,
    arguments: Vec<Expression>,
) -> Expression {
    Expression::Call {
        operation: OperationRef::new(
            model.struct_id(struct_name).unwrap(),
            kind,
            name.to_owned(),
        ),
        arguments,
    }
}

fn value_of(model: &Model, ty: &str, expression: Expression) -> Value {
    Value::new(model.struct_id(ty).unwrap(), expression)
}

fn binding() -> TransitionContext {
    TransitionContext::RuntimeBinding { variable: "x".to_owned() }
}

fn zero(model: &Model, ty: &str) -> Value {
    value_of(model, ty, call(model, ty, Kind::StaticMethod, "zero", Vec::new()))
}

#[test]
fn int_literal_materializes_into_int() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    let int = model.struct_id("Int").unwrap();
    let value = value_of(
        &model,
        "IntLiteral",
        call(&model, "IntLiteral", Kind::InstanceMethod, "add", vec![
            call(&model, "IntLiteral", Kind::StaticMethod, "zero", Vec::new()),
        ]),
    );

    let materialized =
        resolver.resolve_materialization(value.clone(), &binding()).unwrap();

    assert_eq!(materialized.target, int);
    assert_eq!(materialized.domain, Domain::Runtime);
    assert_eq!(materialized.value, RuntimeValue::Converted {
        constructor: model[int]
            .implementations_of(Kind::Constructor, "__init__")[0],
        argument: value,
    });
}

#[test]
fn every_runtime_context_requires_materialization() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    for context in [
        binding(),
        TransitionContext::RuntimeArgument {
            function: "print".to_owned(),
            position: 0,
        },
        TransitionContext::RuntimeReturn { function: "answer".to_owned() },
    ] {
        let materialized = resolver
            .resolve_materialization(zero(&model, "IntLiteral"), &context)
            .unwrap();

        assert!(materialized.value.is_converted(), "{context}");
    }
}

#[test]
fn parameter_binding_keeps_the_value() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    let value = zero(&model, "IntLiteral");
    let materialized = resolver
        .resolve_materialization(
            value.clone(),
            &TransitionContext::ParameterBinding { name: "N".to_owned() },
        )
        .unwrap();

    assert_eq!(materialized.target, value.ty);
    assert_eq!(materialized.domain, Domain::Parameter);
    assert_eq!(materialized.value, RuntimeValue::Unchanged(value));
}

#[test]
fn unrestricted_value_passes_through() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    let value = value_of(&model, "Int", Expression::Literal(Literal::Int(42)));
    let materialized =
        resolver.resolve_materialization(value.clone(), &binding()).unwrap();

    assert_eq!(materialized.domain, Domain::Runtime);
    assert_eq!(materialized.value, RuntimeValue::Unchanged(value));
}

#[test]
fn missing_conversion_constructor() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    let value = value_of(
        &model,
        "FloatLiteral",
        Expression::Literal(Literal::Float64(1.5)),
    );
    let error =
        resolver.resolve_materialization(value, &binding()).unwrap_err();

    assert_eq!(
        error,
        Error::NoMaterializationPath(NoMaterializationPath {
            site: binding(),
            restricted: model.struct_id("FloatLiteral").unwrap(),
            target: model.struct_id("Float").unwrap(),
        })
    );

    colored::control::set_override(false);
    assert_eq!(
        error.report(&model).help_message.as_deref(),
        Some(
            "declare `__init__` on `Float` with a single `FloatLiteral` \
             parameter"
        )
    );
}

#[test]
fn ambiguous_conversion_constructor() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    let value = value_of(
        &model,
        "BoolLiteral",
        Expression::Literal(Literal::Bool(true)),
    );
    let error = resolver
        .resolve_materialization(value, &binding())
        .unwrap_err()
        .into_ambiguous_implementation()
        .unwrap();

    assert_eq!(error.candidates.len(), 2);
    assert_eq!(
        error.origin,
        conformc_conformance::Origin::Conversion(
            model.struct_id("BoolLiteral").unwrap()
        )
    );
}

#[test]
fn reachable_non_inlinable_operation_fails() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    let int = model.struct_id("Int").unwrap();
    let value = value_of(
        &model,
        "IntLiteral",
        call(&model, "IntLiteral", Kind::InstanceMethod, "debug", Vec::new()),
    );

    let error =
        resolver.resolve_materialization(value, &binding()).unwrap_err();

    assert_eq!(
        error,
        Error::NonInlinableOperation(NonInlinableOperation {
            site: binding(),
            operation: OperationRef::new(
                int,
                Kind::InstanceMethod,
                "print".to_owned()
            ),
            implementation: Some(
                model[int].implementations_of(Kind::InstanceMethod, "print")[0]
            ),
        })
    );
}

#[test]
fn unreachable_non_inlinable_operation_is_ignored() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    // `IntLiteral.debug` reaches `Int.print`, but it is not called here
    assert!(resolver
        .resolve_materialization(zero(&model, "IntLiteral"), &binding())
        .is_ok());
}

#[test]
fn unknown_operation_has_no_implementation() {
    let model = model();
    let checker = Checker::new(&model);
    let resolver = Resolver::new(&checker);

    let value = value_of(
        &model,
        "IntLiteral",
        call(&model, "IntLiteral", Kind::StaticMethod, "one", Vec::new()),
    );

    let error = resolver
        .resolve_materialization(value, &binding())
        .unwrap_err()
        .into_non_inlinable_operation()
        .unwrap();

    assert_eq!(error.operation.name, "one");
    assert_eq!(error.implementation, None);
}

#[test]
fn transitions_load_from_ron() {
    const SOURCE: &str = r#"
        (
            value: (
                ty: "IntLiteral",
                expression: Call(
                    struct_name: "IntLiteral",
                    kind: StaticMethod,
                    name: "zero",
                ),
            ),
            context: RuntimeArgument(function: "print", position: 0),
        )
    "#;

    let model = model();
    let declaration: TransitionDeclaration = ron::from_str(SOURCE).unwrap();

    assert_eq!(declaration.context.to_string(), "argument 0 of `print`");
    assert_eq!(
        declaration.resolve(&model).unwrap(),
        zero(&model, "IntLiteral")
    );
}

#[test]
fn transition_with_unknown_type_is_rejected() {
    const SOURCE: &str = r#"
        (
            value: (ty: "Complex", expression: Literal(Int(1))),
            context: RuntimeBinding(variable: "c"),
        )
    "#;

    let model = model();
    let declaration: TransitionDeclaration = ron::from_str(SOURCE).unwrap();

    let error = declaration.resolve(&model).unwrap_err();

    assert_eq!(error.name, "Complex");
    assert_eq!(error.referenced_from, "binding of `c`");
}
