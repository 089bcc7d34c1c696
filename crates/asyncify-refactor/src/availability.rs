//! The availability guard: convert-to-async is offered only for methods
//! that are declared in the program and do not already return an
//! async-completion type. It is the only thing that prevents converting a
//! method twice.

use crate::options::ConvertOptions;
use asyncify_model::{Program, SymbolId, TypeRef};

/// `Task` or `Task<T>` under the configured task type name.
pub fn is_async_completion(ty: &TypeRef, options: &ConvertOptions) -> bool {
    ty.is_plain(&options.task_type) || ty.is_generic_of(&options.task_type)
}

pub fn is_available(program: &Program, symbol: SymbolId, options: &ConvertOptions) -> bool {
    let Some(symbol) = program.symbol(symbol) else {
        return false;
    };
    !symbol.declarations.is_empty() && !is_async_completion(&symbol.return_type, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncify_model::{MethodSpec, ProgramBuilder};

    #[test]
    fn rejects_task_and_generic_task() {
        let options = ConvertOptions::default();
        let mut b = ProgramBuilder::new();
        let svc = b.class("Svc");
        let plain = b.method(svc, MethodSpec::new("Run"));
        let task = b.method(svc, MethodSpec::new("RunAsync").returns(TypeRef::named("Task")));
        let task_of = b.method(
            svc,
            MethodSpec::new("GetAsync").returns(TypeRef::parse("Task<int>").unwrap()),
        );
        let external = b.method(svc, MethodSpec::new("Ext").metadata_only());
        let program = b.finish().unwrap();

        assert!(is_available(&program, plain, &options));
        assert!(!is_available(&program, task, &options));
        assert!(!is_available(&program, task_of, &options));
        assert!(!is_available(&program, external, &options));
        assert!(!is_available(&program, SymbolId(999), &options));
    }

    #[test]
    fn honours_configured_task_type() {
        let options = ConvertOptions {
            task_type: "ValueTask".to_string(),
            ..ConvertOptions::default()
        };
        assert!(is_async_completion(&TypeRef::named("ValueTask"), &options));
        assert!(!is_async_completion(&TypeRef::named("Task"), &options));
        // Two type arguments is not the async-completion shape.
        let pair = TypeRef::generic(
            "ValueTask",
            vec![TypeRef::named("int"), TypeRef::named("int")],
        );
        assert!(!is_async_completion(&pair, &options));
    }
}
