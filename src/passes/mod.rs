//! Semantic passes: skeleton registration, a minimal single-scope name
//! resolver, and field-type resolution, run in that order ahead of MIR
//! lowering.
//!
//! Each pass is a small struct implementing [`AstVisitor`] over `()`, holding
//! whatever mutable state (a `&mut TypeContext`, an accumulated error list)
//! it needs as fields rather than threading it through the return type —
//! the return-type channel is reserved for passes where the *caller* wants
//! a value back per node; these passes only want side effects plus a final
//! error list, so they collect into `self.errors` directly.

use crate::errors::CompileError;
use crate::hir::visitor::AstVisitor;
use crate::hir::{EnumItem, HirNodeId, Item, Module, StructItem, TypeExpr, TypeExprKind};
use crate::types::{EnumInfo, FieldInfo, PrimitiveKind, StructInfo, Type, TypeContext, TypeId, VariantInfo};
use rustc_hash::FxHashMap;

fn primitive_from_name(name: &str) -> Option<PrimitiveKind> {
    Some(match name {
        "i32" => PrimitiveKind::I32,
        "u32" => PrimitiveKind::U32,
        "isize" => PrimitiveKind::Isize,
        "usize" => PrimitiveKind::Usize,
        "bool" => PrimitiveKind::Bool,
        "char" => PrimitiveKind::Char,
        "str" => PrimitiveKind::Str,
        _ => return None,
    })
}

/// Walks top-level items once, registering every struct/enum as a skeleton:
/// correct name, correct field/variant count, field types left
/// `TypeId::INVALID` until [`FieldResolution`] runs.
pub struct SkeletonRegistration<'a> {
    ctx: &'a mut TypeContext,
    pub errors: Vec<CompileError>,
}

impl<'a> SkeletonRegistration<'a> {
    pub fn new(ctx: &'a mut TypeContext) -> Self {
        Self {
            ctx,
            errors: Vec::new(),
        }
    }

    pub fn run(&mut self, module: &Module) {
        for item in &module.items {
            self.visit_item(item);
        }
    }
}

impl AstVisitor<()> for SkeletonRegistration<'_> {
    fn visit_struct_item(&mut self, item: &Item, s: &StructItem) {
        let fields = s
            .fields
            .iter()
            .map(|f| FieldInfo {
                name: f.name.clone(),
                ty: TypeId::INVALID,
            })
            .collect();
        let info = StructInfo {
            name: s.name.clone(),
            fields,
        };
        if let Err(e) = self.ctx.register_struct(info, Some(item.id)) {
            self.errors.push(e.into());
        }
    }

    fn visit_enum_item(&mut self, item: &Item, e: &EnumItem) {
        let variants = e
            .variants
            .iter()
            .map(|name| VariantInfo { name: name.clone() })
            .collect();
        let info = EnumInfo {
            name: e.name.clone(),
            variants,
        };
        if let Err(err) = self.ctx.register_enum(info, Some(item.id)) {
            self.errors.push(err.into());
        }
    }
}

/// A single flat scope mapping a nominal type's name to the HIR node that
/// declared it. Not a general resolver: no shadowing, no modules, no
/// imports. Its only consumer is [`FieldResolution`], which needs to turn a
/// `Named("Point")` annotation back into the `HirNodeId` the type context
/// registered the skeleton under.
#[derive(Default)]
pub struct NameResolver {
    scope: FxHashMap<String, HirNodeId>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, module: &Module) {
        for item in &module.items {
            self.visit_item(item);
        }
    }

    pub fn resolve(&self, name: &str) -> Option<HirNodeId> {
        self.scope.get(name).copied()
    }
}

impl AstVisitor<()> for NameResolver {
    fn visit_struct_item(&mut self, item: &Item, s: &StructItem) {
        // Distinct definitions sharing a name are allowed at this layer;
        // a later insert silently shadows an earlier one. Diagnosing the
        // clash belongs to a real resolver, not this stub.
        self.scope.insert(s.name.clone(), item.id);
    }

    fn visit_enum_item(&mut self, item: &Item, e: &EnumItem) {
        self.scope.insert(e.name.clone(), item.id);
    }
}

/// Resolves one surface type annotation to an interned [`TypeId`], recursing
/// into `Reference`/`Array` structurally (referent/element first, then wrap)
/// per the policy this crate settled on for nested type conversion.
pub fn resolve_type_expr(
    ctx: &mut TypeContext,
    names: &NameResolver,
    type_expr: &TypeExpr,
) -> Result<TypeId, CompileError> {
    match &type_expr.kind {
        TypeExprKind::Named(name) => resolve_named(ctx, names, name),
        TypeExprKind::Reference { inner, mutable } => {
            let referent = resolve_type_expr(ctx, names, inner)?;
            Ok(ctx.get_id(Type::Reference {
                referent,
                mutable: *mutable,
            }))
        }
        TypeExprKind::Array { element, length } => {
            let element = resolve_type_expr(ctx, names, element)?;
            Ok(ctx.get_id(Type::Array {
                element,
                length: *length,
            }))
        }
        TypeExprKind::Unit => Ok(ctx.get_id(Type::Unit)),
        TypeExprKind::Underscore => Ok(ctx.get_id(Type::Underscore)),
    }
}

fn resolve_named(
    ctx: &mut TypeContext,
    names: &NameResolver,
    name: &str,
) -> Result<TypeId, CompileError> {
    if let Some(prim) = primitive_from_name(name) {
        return Ok(ctx.get_id(Type::Primitive(prim)));
    }
    if let Some(def) = names.resolve(name) {
        if let Some(struct_id) = ctx.try_get_struct_id(def) {
            return Ok(ctx.get_id(Type::Struct(struct_id)));
        }
        if let Some(enum_id) = ctx.try_get_enum_id(def) {
            return Ok(ctx.get_id(Type::Enum(enum_id)));
        }
    }
    Err(CompileError::UnresolvedTypeName(name.to_string()))
}

/// Re-walks struct/enum skeletons, filling in each `TypeId::INVALID` field
/// with the concrete id its annotation resolves to.
pub struct FieldResolution<'a> {
    ctx: &'a mut TypeContext,
    names: &'a NameResolver,
    pub errors: Vec<CompileError>,
}

impl<'a> FieldResolution<'a> {
    pub fn new(ctx: &'a mut TypeContext, names: &'a NameResolver) -> Self {
        Self {
            ctx,
            names,
            errors: Vec::new(),
        }
    }

    pub fn run(&mut self, module: &Module) {
        for item in &module.items {
            self.visit_item(item);
        }
    }
}

impl AstVisitor<()> for FieldResolution<'_> {
    fn visit_struct_item(&mut self, item: &Item, s: &StructItem) {
        let struct_id = self.ctx.get_struct_id(item.id);
        if struct_id.is_invalid() {
            return;
        }
        for (index, field) in s.fields.iter().enumerate() {
            match resolve_type_expr(self.ctx, self.names, &field.ty) {
                Ok(ty) => self.ctx.get_struct_mut(struct_id).fields[index].ty = ty,
                Err(e) => self.errors.push(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{HirNodeIdGen, StructField};
    use crate::span::Span;

    fn named_type(id: &mut HirNodeIdGen, name: &str) -> TypeExpr {
        TypeExpr {
            id: id.next(),
            span: Span::dummy(),
            kind: TypeExprKind::Named(name.to_string()),
        }
    }

    fn struct_item(id: &mut HirNodeIdGen, name: &str, fields: Vec<(&str, TypeExpr)>) -> Item {
        Item {
            id: id.next(),
            span: Span::dummy(),
            kind: crate::hir::ItemKind::Struct(StructItem {
                name: name.to_string(),
                fields: fields
                    .into_iter()
                    .map(|(n, ty)| StructField {
                        name: n.to_string(),
                        ty,
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn skeleton_then_resolve_keeps_struct_id_stable() {
        let mut gen = HirNodeIdGen::new();
        let field_ty = named_type(&mut gen, "i32");
        let item = struct_item(&mut gen, "Point", vec![("x", field_ty)]);
        let module = Module {
            items: vec![item],
        };

        let mut ctx = TypeContext::new();
        let mut skeleton = SkeletonRegistration::new(&mut ctx);
        skeleton.run(&module);
        assert!(skeleton.errors.is_empty());

        let struct_id_before = ctx.get_struct_id(module.items[0].id);
        assert!(ctx.get_struct(struct_id_before).fields[0].ty.is_invalid());

        let mut names = NameResolver::new();
        names.run(&module);

        let mut resolver = FieldResolution::new(&mut ctx, &names);
        resolver.run(&module);
        assert!(resolver.errors.is_empty());

        let struct_id_after = ctx.get_struct_id(module.items[0].id);
        assert_eq!(struct_id_before, struct_id_after);
        assert!(!ctx.get_struct(struct_id_after).fields[0].ty.is_invalid());
    }

    #[test]
    fn field_resolution_reports_unknown_type_name() {
        let mut gen = HirNodeIdGen::new();
        let field_ty = named_type(&mut gen, "Nonexistent");
        let item = struct_item(&mut gen, "Wrapper", vec![("inner", field_ty)]);
        let module = Module {
            items: vec![item],
        };

        let mut ctx = TypeContext::new();
        SkeletonRegistration::new(&mut ctx).run(&module);
        let mut names = NameResolver::new();
        names.run(&module);
        let mut resolver = FieldResolution::new(&mut ctx, &names);
        resolver.run(&module);

        assert_eq!(resolver.errors.len(), 1);
        assert!(matches!(
            resolver.errors[0],
            CompileError::UnresolvedTypeName(_)
        ));
    }

    #[test]
    fn nested_reference_resolves_referent_before_wrapping() {
        let mut gen = HirNodeIdGen::new();
        let inner = named_type(&mut gen, "i32");
        let reference = TypeExpr {
            id: gen.next(),
            span: Span::dummy(),
            kind: TypeExprKind::Reference {
                inner: Box::new(inner),
                mutable: false,
            },
        };
        let mut ctx = TypeContext::new();
        let names = NameResolver::new();
        let ty = resolve_type_expr(&mut ctx, &names, &reference).unwrap();
        match ctx.get_type(ty) {
            Type::Reference { referent, mutable } => {
                assert!(!mutable);
                assert_eq!(
                    *ctx.get_type(*referent),
                    Type::Primitive(PrimitiveKind::I32)
                );
            }
            other => panic!("expected Reference, got {other:?}"),
        }
    }
}
