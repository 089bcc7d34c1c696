use asyncify_model::printer::print_program;
use asyncify_model::{MethodSpec, Program, ProgramBuilder, SymbolId, TypeRef};
use asyncify_refactor::{ConversionError, ConvertOptions, ConvertToAsyncAction};

struct Fixture {
    program: Program,
    iface_m: SymbolId,
    impl_m: SymbolId,
}

/// `I.M` implemented by a declared class and by a class known only from
/// metadata, so converting `I.M` aborts after the declared implementation.
fn aborting_hierarchy() -> Fixture {
    let mut b = ProgramBuilder::new();
    let i = b.interface("I");
    let a = b.class("A");
    let ext = b.class("External");
    b.implements(a, i).implements(ext, i);
    let iface_m = b.method(i, MethodSpec::new("M"));
    let impl_m = b.method(a, MethodSpec::new("M"));
    b.body(impl_m, vec![]);
    b.method(ext, MethodSpec::new("M").metadata_only());
    Fixture {
        program: b.finish().unwrap(),
        iface_m,
        impl_m,
    }
}

#[test]
fn metadata() {
    assert_eq!(ConvertToAsyncAction::NAME, "ConvertToAsync");
    assert!(ConvertToAsyncAction::TEXT.starts_with("Convert method to async"));
}

#[test]
fn not_offered_for_async_methods() {
    let mut b = ProgramBuilder::new();
    let svc = b.class("Svc");
    let run = b.method(svc, MethodSpec::new("Run").returns(TypeRef::named("Task")));
    let get = b.method(
        svc,
        MethodSpec::new("Get").returns(TypeRef::parse("Task<string>").unwrap()),
    );
    let mut program = b.finish().unwrap();
    let before = print_program(&program);

    let action = ConvertToAsyncAction::default();
    assert!(!action.is_available(&program, run));
    assert!(!action.is_available(&program, get));
    assert_eq!(
        action.execute(&mut program, run),
        Err(ConversionError::NotAvailable("Svc.Run".to_string()))
    );
    assert_eq!(print_program(&program), before);
}

#[test]
fn resolve_target_filters_unavailable_methods() {
    let mut b = ProgramBuilder::new();
    let svc = b.class("Svc");
    let sync = b.method(svc, MethodSpec::new("Load"));
    b.method(svc, MethodSpec::new("LoadAsync").returns(TypeRef::named("Task")));
    let program = b.finish().unwrap();

    let action = ConvertToAsyncAction::default();
    assert_eq!(action.resolve_target(&program, "Svc.Load"), Some(sync));
    assert_eq!(action.resolve_target(&program, "Svc.LoadAsync"), None);
    assert_eq!(action.resolve_target(&program, "Svc.Nope"), None);
}

#[test]
fn execute_converts_and_second_run_is_refused() {
    let mut b = ProgramBuilder::new();
    let svc = b.class("Svc");
    let m = b.method(svc, MethodSpec::new("M"));
    b.body(m, vec![]);
    let mut program = b.finish().unwrap();

    let action = ConvertToAsyncAction::default();
    let report = action.execute(&mut program, m).unwrap();
    assert_eq!(report.converted_symbols(), vec![m]);
    assert_eq!(
        action.execute(&mut program, m),
        Err(ConversionError::NotAvailable("Svc.MAsync".to_string()))
    );
}

#[test]
fn aborted_pass_is_rolled_back() {
    let Fixture {
        mut program,
        iface_m,
        impl_m,
    } = aborting_hierarchy();
    let before = print_program(&program);

    let err = ConvertToAsyncAction::default()
        .execute(&mut program, iface_m)
        .unwrap_err();

    assert!(matches!(err, ConversionError::UnresolvedMember { .. }), "{err}");
    assert_eq!(print_program(&program), before);
    assert_eq!(program.symbol(impl_m).unwrap().name, "M");
}

#[test]
fn aborted_pass_is_kept_without_rollback() {
    let Fixture {
        mut program,
        iface_m,
        impl_m,
    } = aborting_hierarchy();

    let action = ConvertToAsyncAction::new(ConvertOptions {
        rollback_on_abort: false,
        ..ConvertOptions::default()
    });
    let err = action.execute(&mut program, iface_m).unwrap_err();

    match err {
        ConversionError::UnresolvedMember { converted, .. } => {
            assert_eq!(converted, vec![impl_m]);
        }
        other => panic!("expected UnresolvedMember, got {other:?}"),
    }
    assert_eq!(program.symbol(impl_m).unwrap().name, "MAsync");
}
