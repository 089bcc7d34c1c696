use asyncify_model::printer::print_method;
use asyncify_model::{
    MethodSpec, ModifierFlags, NodeIndex, Program, ProgramBuilder, SymbolId, TypeRef,
};
use asyncify_refactor::report::CallOrigin;
use asyncify_refactor::{AsyncConverter, ConversionReport, ConvertOptions, CounterpartPolicy};

fn convert_with(
    program: &mut Program,
    root: SymbolId,
    counterpart: CounterpartPolicy,
) -> ConversionReport {
    let options = ConvertOptions {
        counterpart,
        ..ConvertOptions::default()
    };
    AsyncConverter::new(options).convert(program, root).unwrap()
}

fn task_of(inner: &str) -> TypeRef {
    TypeRef::generic("Task", vec![TypeRef::named(inner)])
}

struct Repo {
    program: Program,
    load: SymbolId,
    fetch_async: SymbolId,
    call: NodeIndex,
}

/// `int Load(int id) { return Fetch(id); }` next to `Fetch` and `FetchAsync`.
fn repo_with_fetch_async() -> Repo {
    let mut b = ProgramBuilder::new();
    let repo = b.class("Repo");
    let fetch = b.method(
        repo,
        MethodSpec::new("Fetch")
            .returns(TypeRef::named("int"))
            .param("id", TypeRef::named("int")),
    );
    let fetch_async = b.method(
        repo,
        MethodSpec::new("FetchAsync")
            .returns(task_of("int"))
            .param("id", TypeRef::named("int")),
    );
    let load = b.method(
        repo,
        MethodSpec::new("Load")
            .returns(TypeRef::named("int"))
            .param("id", TypeRef::named("int"))
            .modifiers(ModifierFlags::PUBLIC),
    );
    let arg = b.name("id");
    let call = b.call(fetch, vec![arg]);
    let ret = b.ret(call);
    b.body(load, vec![ret]);
    Repo {
        program: b.finish().unwrap(),
        load,
        fetch_async,
        call,
    }
}

#[test]
fn body_invocation_is_retargeted_to_async_counterpart() {
    let Repo {
        mut program,
        load,
        fetch_async,
        call,
    } = repo_with_fetch_async();

    let report = convert_with(&mut program, load, CounterpartPolicy::Strict);

    assert_eq!(
        print_method(&program, load),
        "public async Task<int> LoadAsync(int id)\n{\n    return await FetchAsync(id);\n}\n"
    );
    let scanned: Vec<_> = report.rewritten_from(CallOrigin::BodyScan).collect();
    assert_eq!(scanned.len(), 1);
    assert_eq!(scanned[0].target, fetch_async);
    assert!(scanned[0].awaited);
    assert_ne!(scanned[0].node, call, "awaited calls move under the await node");
}

#[test]
fn counterpart_policy_off_leaves_body_alone() {
    let Repo {
        mut program, load, ..
    } = repo_with_fetch_async();

    let report = convert_with(&mut program, load, CounterpartPolicy::Off);

    assert_eq!(
        print_method(&program, load),
        "public async Task<int> LoadAsync(int id)\n{\n    return Fetch(id);\n}\n"
    );
    assert!(report.rewritten.is_empty());
}

#[test]
fn strict_and_name_only_differ_on_mismatched_overload() {
    let build = || {
        let mut b = ProgramBuilder::new();
        let svc = b.class("Svc");
        let save = b.method(svc, MethodSpec::new("Save"));
        // Same name, different parameters: not a counterpart of Save().
        b.method(
            svc,
            MethodSpec::new("SaveAsync")
                .returns(TypeRef::named("Task"))
                .param("force", TypeRef::named("bool")),
        );
        let run = b.method(svc, MethodSpec::new("Run"));
        let call = b.call(save, vec![]);
        let stmt = b.expr(call);
        b.body(run, vec![stmt]);
        (b.finish().unwrap(), run)
    };

    let (mut strict, run) = build();
    convert_with(&mut strict, run, CounterpartPolicy::Strict);
    assert_eq!(
        print_method(&strict, run),
        "async Task RunAsync()\n{\n    Save();\n}\n"
    );

    let (mut loose, run) = build();
    convert_with(&mut loose, run, CounterpartPolicy::NameOnly);
    assert_eq!(
        print_method(&loose, run),
        "async Task RunAsync()\n{\n    await SaveAsync();\n}\n"
    );
}

#[test]
fn ambiguous_counterpart_is_not_chosen() {
    let mut b = ProgramBuilder::new();
    let svc = b.class("Svc");
    let save = b.method(svc, MethodSpec::new("Save"));
    for key in ["Svc.SaveAsync#1", "Svc.SaveAsync#2"] {
        b.method(
            svc,
            MethodSpec::new("SaveAsync")
                .returns(TypeRef::named("Task"))
                .key(key),
        );
    }
    let run = b.method(svc, MethodSpec::new("Run"));
    let call = b.call(save, vec![]);
    let stmt = b.expr(call);
    b.body(run, vec![stmt]);
    let mut program = b.finish().unwrap();

    let report = convert_with(&mut program, run, CounterpartPolicy::Strict);
    assert!(report.rewritten.is_empty());
    assert_eq!(
        print_method(&program, run),
        "async Task RunAsync()\n{\n    Save();\n}\n"
    );
}

#[test]
fn body_scan_respects_lambdas_local_functions_and_unresolved_calls() {
    let mut b = ProgramBuilder::new();
    let svc = b.class("Svc");
    let log = b.method(svc, MethodSpec::new("Log"));
    b.method(svc, MethodSpec::new("LogAsync").returns(TypeRef::named("Task")));
    let run = b.method(svc, MethodSpec::new("Run"));

    let in_lambda = b.call(log, vec![]);
    let stmt = b.expr(in_lambda);
    let lambda = b.lambda(false, vec![], vec![stmt]);
    let local = b.local("f", lambda);

    let in_local = b.call(log, vec![]);
    let stmt = b.expr(in_local);
    let helper = b.local_function("Helper", false, TypeRef::Void, vec![stmt]);

    let external = b.call_unresolved(NodeIndex::NONE, "Console.WriteLine", vec![]);
    let stmt = b.expr(external);
    b.body(run, vec![local, helper, stmt]);
    let mut program = b.finish().unwrap();

    let report = convert_with(&mut program, run, CounterpartPolicy::Strict);

    assert_eq!(
        print_method(&program, run),
        "async Task RunAsync()\n\
         {\n    var f = () => { await LogAsync(); };\n\
         \x20   void Helper()\n    {\n        LogAsync();\n    }\n\
         \x20   Console.WriteLine();\n}\n"
    );
    assert_eq!(report.rewritten_from(CallOrigin::BodyScan).count(), 2);
}

#[test]
fn every_partial_declaration_body_is_scanned() {
    let mut b = ProgramBuilder::new();
    let svc = b.class("Svc");
    let ping = b.method(svc, MethodSpec::new("Ping"));
    b.method(svc, MethodSpec::new("PingAsync").returns(TypeRef::named("Task")));
    let run = b.method(svc, MethodSpec::new("Run"));
    let first = b.call(ping, vec![]);
    let stmt = b.expr(first);
    b.body(run, vec![stmt]);
    let second = b.call(ping, vec![]);
    let stmt = b.expr(second);
    b.partial(run, vec![stmt]);
    let mut program = b.finish().unwrap();

    let report = convert_with(&mut program, run, CounterpartPolicy::Strict);

    assert_eq!(report.rewritten_from(CallOrigin::BodyScan).count(), 2);
    let text = print_method(&program, run);
    assert_eq!(text.matches("await PingAsync();").count(), 2, "{text}");
}

#[test]
fn planned_callees_are_rewritten_once_by_reference_search() {
    let mut b = ProgramBuilder::new();
    let svc = b.class("Svc");
    let walk = b.method(svc, MethodSpec::new("Walk"));
    // A counterpart-looking member must not steal the recursive call.
    b.method(svc, MethodSpec::new("WalkAsync").returns(TypeRef::named("Task")));
    let call = b.call(walk, vec![]);
    let stmt = b.expr(call);
    b.body(walk, vec![stmt]);
    let mut program = b.finish().unwrap();

    let report = convert_with(&mut program, walk, CounterpartPolicy::Strict);

    assert_eq!(report.rewritten.len(), 1);
    assert_eq!(report.rewritten[0].origin, CallOrigin::ReferenceSearch);
    assert_eq!(report.rewritten[0].target, walk);
    assert!(report.rewritten[0].awaited);
}
