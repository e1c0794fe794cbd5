//! Structural type interning and nominal-type registration.
//!
//! `TypeContext` plays the same role as the teacher project's `StringTable`:
//! a `Vec` for id -> value resolution paired with a reverse map for
//! value -> id interning, so `get_id` is O(1) average case and stable for the
//! lifetime of the context.

use crate::hir::HirNodeId;
use rustc_hash::FxHashMap;

/// Stable identifier for an interned [`Type`]. Two `TypeId`s compare equal iff
/// the `Type`s they were interned from compare equal structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const INVALID: TypeId = TypeId(u32::MAX);

    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

/// Stable identifier for a registered struct, dense from zero in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructId(pub u32);

impl StructId {
    pub const INVALID: StructId = StructId(u32::MAX);
}

/// Stable identifier for a registered enum, dense from zero in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumId(pub u32);

impl EnumId {
    pub const INVALID: EnumId = EnumId(u32::MAX);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    I32,
    U32,
    Isize,
    Usize,
    Bool,
    Char,
    Str,
    /// Numeric-literal placeholder used before type resolution settles on a
    /// concrete signed type.
    AnyInt,
    /// Numeric-literal placeholder used before type resolution settles on a
    /// concrete unsigned type.
    AnyUint,
}

/// A structurally-identified type. Two `Type` values are `==` iff their
/// variants are deep-equal; [`TypeContext::get_id`] relies on exactly this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Struct(StructId),
    Enum(EnumId),
    Reference { referent: TypeId, mutable: bool },
    Array { element: TypeId, length: usize },
    Unit,
    Never,
    /// Type-inference placeholder ("don't know yet").
    Underscore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInfo {
    pub name: String,
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: String,
    pub variants: Vec<VariantInfo>,
}

#[derive(Debug, thiserror::Error)]
pub enum TypeContextError {
    #[error("the same definition was registered twice")]
    DuplicateDefinition,
}

/// Process-wide (per-compilation) registry of structural types and nominal
/// definitions. Owned by the driver and threaded as `&mut TypeContext`
/// through every pass rather than reached for as a global, so the borrow
/// checker — not a documented invariant — enforces single-writer access.
#[derive(Default)]
pub struct TypeContext {
    types: Vec<Type>,
    type_ids: FxHashMap<Type, TypeId>,

    structs: Vec<StructInfo>,
    struct_defs: Vec<Option<HirNodeId>>,
    struct_id_by_def: FxHashMap<HirNodeId, StructId>,

    enums: Vec<EnumInfo>,
    enum_defs: Vec<Option<HirNodeId>>,
    enum_id_by_def: FxHashMap<HirNodeId, EnumId>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `t`, returning its existing id if seen before or a fresh one
    /// otherwise. Idempotent: calling this twice with structurally-equal
    /// values always returns the same [`TypeId`].
    pub fn get_id(&mut self, t: Type) -> TypeId {
        if let Some(&id) = self.type_ids.get(&t) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.type_ids.insert(t.clone(), id);
        self.types.push(t);
        id
    }

    /// # Panics
    /// Panics if `id` was not produced by this context (an out-of-range
    /// `TypeId` is a programmer error, never a user-facing condition).
    pub fn get_type(&self, id: TypeId) -> &Type {
        self.types
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("invalid TypeId {}", id.0))
    }

    pub fn get_type_copy(&self, id: TypeId) -> Type {
        self.get_type(id).clone()
    }

    /// Registers a struct skeleton or its field-resolved form, recording an
    /// optional back-reference to the HIR node that declared it.
    ///
    /// Distinct definitions with the same name get distinct ids; name
    /// clashes are a name-resolution concern, not this layer's. Registering
    /// the same `def` twice is rejected.
    pub fn register_struct(
        &mut self,
        info: StructInfo,
        def: Option<HirNodeId>,
    ) -> Result<StructId, TypeContextError> {
        if let Some(def) = def {
            if self.struct_id_by_def.contains_key(&def) {
                return Err(TypeContextError::DuplicateDefinition);
            }
        }
        let id = StructId(self.structs.len() as u32);
        self.structs.push(info);
        self.struct_defs.push(def);
        if let Some(def) = def {
            self.struct_id_by_def.insert(def, id);
        }
        Ok(id)
    }

    pub fn register_enum(
        &mut self,
        info: EnumInfo,
        def: Option<HirNodeId>,
    ) -> Result<EnumId, TypeContextError> {
        if let Some(def) = def {
            if self.enum_id_by_def.contains_key(&def) {
                return Err(TypeContextError::DuplicateDefinition);
            }
        }
        let id = EnumId(self.enums.len() as u32);
        self.enums.push(info);
        self.enum_defs.push(def);
        if let Some(def) = def {
            self.enum_id_by_def.insert(def, id);
        }
        Ok(id)
    }

    pub fn get_struct_id(&self, def: HirNodeId) -> StructId {
        self.try_get_struct_id(def).unwrap_or(StructId::INVALID)
    }

    pub fn try_get_struct_id(&self, def: HirNodeId) -> Option<StructId> {
        self.struct_id_by_def.get(&def).copied()
    }

    pub fn get_enum_id(&self, def: HirNodeId) -> EnumId {
        self.try_get_enum_id(def).unwrap_or(EnumId::INVALID)
    }

    pub fn try_get_enum_id(&self, def: HirNodeId) -> Option<EnumId> {
        self.enum_id_by_def.get(&def).copied()
    }

    pub fn get_struct(&self, id: StructId) -> &StructInfo {
        &self.structs[id.0 as usize]
    }

    pub fn get_struct_mut(&mut self, id: StructId) -> &mut StructInfo {
        &mut self.structs[id.0 as usize]
    }

    pub fn get_enum(&self, id: EnumId) -> &EnumInfo {
        &self.enums[id.0 as usize]
    }
}

/// Numeric-literal coercion: `__ANYINT__`/`__ANYUINT__` narrow to a concrete
/// integer type, everything else only coerces to itself. Returns the
/// resulting concrete `TypeId`, or `None` if no coercion applies.
pub fn coerce(ctx: &TypeContext, from: TypeId, to: TypeId) -> Option<TypeId> {
    let (Type::Primitive(from_kind), Type::Primitive(to_kind)) =
        (ctx.get_type(from), ctx.get_type(to))
    else {
        return None;
    };

    match from_kind {
        PrimitiveKind::AnyInt => {
            matches!(to_kind, PrimitiveKind::I32 | PrimitiveKind::Isize).then_some(to)
        }
        PrimitiveKind::AnyUint => matches!(
            to_kind,
            PrimitiveKind::U32 | PrimitiveKind::Usize | PrimitiveKind::AnyInt
        )
        .then_some(to),
        _ => (from_kind == to_kind).then_some(from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_id_is_idempotent_for_equal_values() {
        let mut ctx = TypeContext::new();
        let a = ctx.get_id(Type::Primitive(PrimitiveKind::I32));
        let b = ctx.get_id(Type::Primitive(PrimitiveKind::I32));
        assert_eq!(a, b);
    }

    #[test]
    fn get_id_distinguishes_array_length() {
        let mut ctx = TypeContext::new();
        let i32_ty = ctx.get_id(Type::Primitive(PrimitiveKind::I32));
        let a = ctx.get_id(Type::Array {
            element: i32_ty,
            length: 4,
        });
        let b = ctx.get_id(Type::Array {
            element: i32_ty,
            length: 5,
        });
        assert_ne!(a, b);
    }

    #[test]
    fn get_id_distinguishes_reference_mutability() {
        let mut ctx = TypeContext::new();
        let i32_ty = ctx.get_id(Type::Primitive(PrimitiveKind::I32));
        let imm = ctx.get_id(Type::Reference {
            referent: i32_ty,
            mutable: false,
        });
        let mutref = ctx.get_id(Type::Reference {
            referent: i32_ty,
            mutable: true,
        });
        assert_ne!(imm, mutref);
    }

    #[test]
    fn singleton_types_have_one_id() {
        let mut ctx = TypeContext::new();
        assert_eq!(ctx.get_id(Type::Unit), ctx.get_id(Type::Unit));
        assert_eq!(ctx.get_id(Type::Never), ctx.get_id(Type::Never));
        assert_eq!(ctx.get_id(Type::Underscore), ctx.get_id(Type::Underscore));
    }

    #[test]
    fn register_struct_rejects_duplicate_def() {
        let mut ctx = TypeContext::new();
        let def = HirNodeId(1);
        ctx.register_struct(
            StructInfo {
                name: "Point".into(),
                fields: vec![],
            },
            Some(def),
        )
        .unwrap();
        let err = ctx
            .register_struct(
                StructInfo {
                    name: "Point2".into(),
                    fields: vec![],
                },
                Some(def),
            )
            .unwrap_err();
        assert!(matches!(err, TypeContextError::DuplicateDefinition));
    }

    #[test]
    fn distinct_defs_same_name_get_distinct_ids() {
        let mut ctx = TypeContext::new();
        let a = ctx
            .register_struct(
                StructInfo {
                    name: "Point".into(),
                    fields: vec![],
                },
                Some(HirNodeId(1)),
            )
            .unwrap();
        let b = ctx
            .register_struct(
                StructInfo {
                    name: "Point".into(),
                    fields: vec![],
                },
                Some(HirNodeId(2)),
            )
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn coerce_anyint_narrows_to_concrete_signed() {
        let mut ctx = TypeContext::new();
        let anyint = ctx.get_id(Type::Primitive(PrimitiveKind::AnyInt));
        let isize_ty = ctx.get_id(Type::Primitive(PrimitiveKind::Isize));
        let bool_ty = ctx.get_id(Type::Primitive(PrimitiveKind::Bool));
        assert_eq!(coerce(&ctx, anyint, isize_ty), Some(isize_ty));
        assert_eq!(coerce(&ctx, anyint, bool_ty), None);
    }

    #[test]
    fn coerce_anyuint_narrows_to_anyint_too() {
        let mut ctx = TypeContext::new();
        let anyuint = ctx.get_id(Type::Primitive(PrimitiveKind::AnyUint));
        let anyint = ctx.get_id(Type::Primitive(PrimitiveKind::AnyInt));
        assert_eq!(coerce(&ctx, anyuint, anyint), Some(anyint));
    }

    #[test]
    fn coerce_identical_primitives_is_reflexive() {
        let mut ctx = TypeContext::new();
        let bool_ty = ctx.get_id(Type::Primitive(PrimitiveKind::Bool));
        assert_eq!(coerce(&ctx, bool_ty, bool_ty), Some(bool_ty));
    }

    #[test]
    fn coerce_non_primitive_is_undefined() {
        let mut ctx = TypeContext::new();
        let struct_ty = ctx.get_id(Type::Struct(StructId(0)));
        let i32_ty = ctx.get_id(Type::Primitive(PrimitiveKind::I32));
        assert_eq!(coerce(&ctx, struct_ty, i32_ty), None);
    }
}
