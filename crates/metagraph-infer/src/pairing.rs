//! Interface/implementation pairing by naming convention.
//!
//! `spoon.reflect.code.CtBlock` is implemented by
//! `spoon.support.reflect.code.CtBlockImpl`: same relative package below the
//! implementation root, same simple name plus the implementation suffix.
//! Both declarations share the logical name `CtBlock`.

use metagraph_core::config::MetaModelConfig;
use metagraph_core::decl::{DeclarationModel, TypeDecl, TypeDeclId, TypeKind};
use metagraph_core::error::{MetaModelError, MetaModelResult};

/// Logical meta-type name of a declaration.
pub fn meta_type_name<'a>(config: &MetaModelConfig, decl: &'a TypeDecl) -> &'a str {
    config.meta_type_name(decl.simple_name())
}

/// The implementation class of `iface`, if one is declared.
pub fn implementation_of_interface<M>(
    model: &M,
    config: &MetaModelConfig,
    iface: TypeDeclId,
) -> MetaModelResult<Option<TypeDeclId>>
where
    M: DeclarationModel + ?Sized,
{
    let class_name = config.impl_class_name_of(&model.type_decl(iface).qualified_name)?;
    lookup_kind(model, &class_name, TypeKind::Class)
}

/// The governing interface of `class`, if one is declared.
///
/// Fails if the class name does not follow the implementation convention.
pub fn interface_of_implementation<M>(
    model: &M,
    config: &MetaModelConfig,
    class: TypeDeclId,
) -> MetaModelResult<Option<TypeDeclId>>
where
    M: DeclarationModel + ?Sized,
{
    let iface_name = config.interface_name_of_impl(&model.type_decl(class).qualified_name)?;
    lookup_kind(model, &iface_name, TypeKind::Interface)
}

fn lookup_kind<M>(
    model: &M,
    qualified_name: &str,
    expected: TypeKind,
) -> MetaModelResult<Option<TypeDeclId>>
where
    M: DeclarationModel + ?Sized,
{
    let Some(id) = model.find_type(qualified_name) else {
        return Ok(None);
    };
    let found = model.type_decl(id).kind;
    if found != expected {
        return Err(MetaModelError::UnexpectedDeclarationKind {
            qualified_name: qualified_name.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(Some(id))
}

/// The declarations backing one meta type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub interface: TypeDeclId,
    pub class: Option<TypeDeclId>,
}

impl Pairing {
    /// Class first, then interface.
    pub fn declarations(&self) -> impl Iterator<Item = TypeDeclId> {
        self.class.into_iter().chain(std::iter::once(self.interface))
    }
}

/// Pair `decl` with its counterpart, starting from either side.
pub fn pair_of<M>(model: &M, config: &MetaModelConfig, decl: TypeDeclId) -> MetaModelResult<Pairing>
where
    M: DeclarationModel + ?Sized,
{
    let type_decl = model.type_decl(decl);
    match type_decl.kind {
        TypeKind::Interface => Ok(Pairing {
            interface: decl,
            class: implementation_of_interface(model, config, decl)?,
        }),
        TypeKind::Class => {
            let iface = interface_of_implementation(model, config, decl)?.ok_or_else(|| {
                MetaModelError::MissingInterface {
                    class: type_decl.qualified_name.clone(),
                }
            })?;
            Ok(Pairing {
                interface: iface,
                class: Some(decl),
            })
        }
        other => Err(MetaModelError::UnexpectedDeclarationKind {
            qualified_name: type_decl.qualified_name.clone(),
            expected: "interface or class".to_string(),
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ModelFixture;

    #[test]
    fn test_pair_from_interface() {
        let mut fx = ModelFixture::spoon();
        let iface = fx.iface("spoon.reflect.code.CtBlock", &[]);
        let class = fx.class(
            "spoon.support.reflect.code.CtBlockImpl",
            None,
            &["spoon.reflect.code.CtBlock"],
        );

        let config = MetaModelConfig::default();
        let pairing = pair_of(&fx.store, &config, iface).unwrap();
        assert_eq!(pairing.interface, iface);
        assert_eq!(pairing.class, Some(class));
        assert_eq!(pairing.declarations().collect::<Vec<_>>(), vec![class, iface]);

        assert_eq!(pair_of(&fx.store, &config, class).unwrap(), pairing);
        assert_eq!(meta_type_name(&config, fx.store.type_decl(class)), "CtBlock");
    }

    #[test]
    fn test_interface_without_implementation_is_a_leaf() {
        let mut fx = ModelFixture::spoon();
        let iface = fx.iface("spoon.reflect.declaration.CtShadowable", &[]);

        let config = MetaModelConfig::default();
        assert_eq!(
            implementation_of_interface(&fx.store, &config, iface).unwrap(),
            None
        );
        let pairing = pair_of(&fx.store, &config, iface).unwrap();
        assert_eq!(pairing.declarations().count(), 1);
    }

    #[test]
    fn test_class_without_interface_fails() {
        let mut fx = ModelFixture::spoon();
        let class = fx.class("spoon.support.reflect.code.CtOrphanImpl", None, &[]);

        let config = MetaModelConfig::default();
        let err = pair_of(&fx.store, &config, class).unwrap_err();
        assert!(matches!(err, MetaModelError::MissingInterface { .. }));
    }

    #[test]
    fn test_badly_named_class_fails() {
        let mut fx = ModelFixture::spoon();
        let class = fx.class("spoon.support.reflect.code.CtBlockHelper", None, &[]);

        let config = MetaModelConfig::default();
        let err = interface_of_implementation(&fx.store, &config, class).unwrap_err();
        assert!(matches!(
            err,
            MetaModelError::InvalidImplementationNaming { .. }
        ));
    }

    #[test]
    fn test_counterpart_of_wrong_kind_fails() {
        let mut fx = ModelFixture::spoon();
        let iface = fx.iface("spoon.reflect.code.CtBlock", &[]);
        fx.iface("spoon.support.reflect.code.CtBlockImpl", &[]);

        let config = MetaModelConfig::default();
        let err = implementation_of_interface(&fx.store, &config, iface).unwrap_err();
        match err {
            MetaModelError::UnexpectedDeclarationKind {
                expected, found, ..
            } => {
                assert_eq!(expected, "class");
                assert_eq!(found, "interface");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_interface_outside_api_root_fails() {
        let mut fx = ModelFixture::spoon();
        let iface = fx.iface("java.lang.Runnable", &[]);

        let config = MetaModelConfig::default();
        let err = pair_of(&fx.store, &config, iface).unwrap_err();
        assert!(matches!(err, MetaModelError::OutsideApiRoot { .. }));
    }
}
