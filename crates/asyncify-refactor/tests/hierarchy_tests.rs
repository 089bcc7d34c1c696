use asyncify_model::{MethodSpec, ModifierFlags, ProgramBuilder, TypeRef};
use asyncify_refactor::hierarchy::HierarchyNavigator;

#[test]
fn interface_member_and_its_implementations() {
    let mut b = ProgramBuilder::new();
    let i = b.interface("I");
    let a = b.class("A");
    let bb = b.class("B");
    b.implements(a, i).implements(bb, i);
    let im = b.method(i, MethodSpec::new("M"));
    let am = b.method(a, MethodSpec::new("M"));
    let bm = b.method(bb, MethodSpec::new("M"));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(am).as_slice(), &[im]);
    assert_eq!(nav.immediate_bases(bm).as_slice(), &[im]);
    assert!(nav.immediate_bases(im).is_empty(), "I.M introduces the member");
    assert_eq!(nav.implementing_members(im), vec![am, bm]);
    assert!(
        nav.implementing_members(am).is_empty(),
        "B.M is a sibling of A.M, not below it"
    );
}

#[test]
fn override_chain_is_transitive_and_breadth_first() {
    let mut b = ProgramBuilder::new();
    let base = b.class("Base");
    let mid = b.class("Mid");
    let leaf = b.class("Leaf");
    let other = b.class("Other");
    b.extends(mid, base).extends(leaf, mid).extends(other, base);
    let base_m = b.method(base, MethodSpec::new("M").modifiers(ModifierFlags::VIRTUAL));
    let mid_m = b.method(mid, MethodSpec::new("M").modifiers(ModifierFlags::OVERRIDE));
    let leaf_m = b.method(leaf, MethodSpec::new("M").modifiers(ModifierFlags::OVERRIDE));
    let other_m = b.method(other, MethodSpec::new("M").modifiers(ModifierFlags::OVERRIDE));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(leaf_m).as_slice(), &[mid_m]);
    assert_eq!(
        nav.implementing_members(base_m),
        vec![mid_m, other_m, leaf_m],
        "direct overrides come before their own overrides"
    );
}

#[test]
fn override_skips_intermediate_class_without_the_member() {
    let mut b = ProgramBuilder::new();
    let base = b.class("Base");
    let mid = b.class("Mid");
    let leaf = b.class("Leaf");
    b.extends(mid, base).extends(leaf, mid);
    let base_m = b.method(base, MethodSpec::new("M").modifiers(ModifierFlags::VIRTUAL));
    let leaf_m = b.method(leaf, MethodSpec::new("M").modifiers(ModifierFlags::OVERRIDE));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(leaf_m).as_slice(), &[base_m]);
}

#[test]
fn hiding_method_is_not_an_override() {
    let mut b = ProgramBuilder::new();
    let base = b.class("Base");
    let derived = b.class("Derived");
    b.extends(derived, base);
    let base_m = b.method(base, MethodSpec::new("M"));
    let hiding = b.method(derived, MethodSpec::new("M"));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert!(nav.immediate_bases(hiding).is_empty());
    assert!(nav.implementing_members(base_m).is_empty());
}

#[test]
fn multiple_interfaces_give_multiple_parents() {
    let mut b = ProgramBuilder::new();
    let reader = b.interface("IReader");
    let loader = b.interface("ILoader");
    let repo = b.class("Repo");
    b.implements(repo, reader).implements(repo, loader);
    let read_m = b.method(reader, MethodSpec::new("Load"));
    let load_m = b.method(loader, MethodSpec::new("Load"));
    let repo_m = b.method(repo, MethodSpec::new("Load"));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(repo_m).as_slice(), &[read_m, load_m]);
}

#[test]
fn inherited_interface_member_is_found_through_the_derived_interface() {
    let mut b = ProgramBuilder::new();
    let base = b.interface("IBase");
    let derived = b.interface("IDerived");
    let svc = b.class("Svc");
    b.implements(derived, base).implements(svc, derived);
    let base_m = b.method(base, MethodSpec::new("Run"));
    let svc_m = b.method(svc, MethodSpec::new("Run"));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(svc_m).as_slice(), &[base_m]);
    assert_eq!(nav.implementing_members(base_m), vec![svc_m]);
}

#[test]
fn overloads_match_on_parameter_types() {
    let mut b = ProgramBuilder::new();
    let i = b.interface("I");
    let c = b.class("C");
    b.implements(c, i);
    let by_id = b.method(
        i,
        MethodSpec::new("Find")
            .param("id", TypeRef::named("int"))
            .key("I.Find(int)"),
    );
    let by_name = b.method(
        i,
        MethodSpec::new("Find")
            .param("name", TypeRef::named("string"))
            .key("I.Find(string)"),
    );
    let impl_name = b.method(
        c,
        MethodSpec::new("Find")
            .param("n", TypeRef::named("string"))
            .key("C.Find(string)"),
    );
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(impl_name).as_slice(), &[by_name]);
    assert!(nav.implementing_members(by_id).is_empty());
}

#[test]
fn static_methods_have_no_edges() {
    let mut b = ProgramBuilder::new();
    let i = b.interface("I");
    let c = b.class("C");
    b.implements(c, i);
    b.method(i, MethodSpec::new("M"));
    let static_m = b.method(c, MethodSpec::new("M").modifiers(ModifierFlags::STATIC));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert!(nav.immediate_bases(static_m).is_empty());
}

#[test]
fn symbol_without_declaration_yields_empty_sets() {
    let mut b = ProgramBuilder::new();
    let i = b.interface("IExternal");
    let c = b.class("C");
    b.implements(c, i);
    let external = b.method(i, MethodSpec::new("M").metadata_only());
    let cm = b.method(c, MethodSpec::new("M"));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert!(nav.implementing_members(external).is_empty());
    // Still reachable as a base of a declared method.
    assert_eq!(nav.immediate_bases(cm).as_slice(), &[external]);
}

#[test]
fn class_member_implements_redeclared_members_of_the_whole_interface_closure() {
    let mut b = ProgramBuilder::new();
    let base = b.interface("I1");
    let derived = b.interface("I2");
    let c = b.class("C");
    b.implements(derived, base).implements(c, derived);
    let base_m = b.method(base, MethodSpec::new("M"));
    let derived_m = b.method(derived, MethodSpec::new("M"));
    let cm = b.method(c, MethodSpec::new("M"));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(cm).as_slice(), &[derived_m, base_m]);
    assert!(
        nav.immediate_bases(derived_m).is_empty(),
        "I2.M hides I1.M"
    );
    assert_eq!(nav.implementing_members(base_m), vec![cm]);
    assert_eq!(nav.implementing_members(derived_m), vec![cm]);
}

#[test]
fn inherited_member_implements_interface_listed_on_derived_class() {
    let mut b = ProgramBuilder::new();
    let i = b.interface("I");
    let base = b.class("B");
    let c = b.class("C");
    let shadowing = b.class("D");
    b.extends(c, base).implements(c, i);
    b.extends(shadowing, base).implements(shadowing, i);
    let im = b.method(i, MethodSpec::new("M"));
    let bm = b.method(base, MethodSpec::new("M"));
    let dm = b.method(shadowing, MethodSpec::new("M"));
    let program = b.finish().unwrap();

    let nav = HierarchyNavigator::new(&program);
    assert_eq!(nav.immediate_bases(bm).as_slice(), &[im]);
    assert_eq!(nav.immediate_bases(dm).as_slice(), &[im]);
    assert_eq!(nav.implementing_members(im), vec![bm, dm]);
}
