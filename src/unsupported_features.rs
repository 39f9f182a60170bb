//! Unsupported feature registry (centralized guard for the source pre-scan)

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedFeature {
    ClassDeclaration,
    ArrowFunction,
    AsyncFunction,
    AwaitExpr,
    ImportDeclaration,
    ExportDeclaration,
    TryStatement,
    ThrowStatement,
    SwitchStatement,
    DoWhileStatement,
    YieldExpr,
    InterfaceDeclaration,
    EnumDeclaration,
    TypeAlias,
    AsExpression,
    SatisfiesExpression,
    NamespaceDeclaration,
    AmbientDeclaration,
}

impl UnsupportedFeature {
    pub const ALL: [UnsupportedFeature; 18] = [
        UnsupportedFeature::ClassDeclaration,
        UnsupportedFeature::ArrowFunction,
        UnsupportedFeature::AsyncFunction,
        UnsupportedFeature::AwaitExpr,
        UnsupportedFeature::ImportDeclaration,
        UnsupportedFeature::ExportDeclaration,
        UnsupportedFeature::TryStatement,
        UnsupportedFeature::ThrowStatement,
        UnsupportedFeature::SwitchStatement,
        UnsupportedFeature::DoWhileStatement,
        UnsupportedFeature::YieldExpr,
        UnsupportedFeature::InterfaceDeclaration,
        UnsupportedFeature::EnumDeclaration,
        UnsupportedFeature::TypeAlias,
        UnsupportedFeature::AsExpression,
        UnsupportedFeature::SatisfiesExpression,
        UnsupportedFeature::NamespaceDeclaration,
        UnsupportedFeature::AmbientDeclaration,
    ];
}

#[derive(Debug, Clone)]
pub struct UnsupportedFeatureRegistry {
    enabled: HashSet<UnsupportedFeature>,
}

impl UnsupportedFeatureRegistry {
    pub fn new(enabled: HashSet<UnsupportedFeature>) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self, feature: UnsupportedFeature) -> bool {
        self.enabled.contains(&feature)
    }

    pub fn enable(&mut self, feature: UnsupportedFeature) {
        self.enabled.insert(feature);
    }

    pub fn disable(&mut self, feature: UnsupportedFeature) {
        self.enabled.remove(&feature);
    }
}

impl Default for UnsupportedFeatureRegistry {
    fn default() -> Self {
        Self {
            enabled: UnsupportedFeature::ALL.into_iter().collect(),
        }
    }
}
