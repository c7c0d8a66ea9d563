// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC class hierarchy
//!
//! Type filters such as `IfcBuildingElement` select every entity whose
//! declared class is that class or one of its subtypes. The table below
//! covers the IFC4 product branch used by building models.

use std::fmt;

/// IFC classes known to the type filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfcClass {
    IfcRoot,
    IfcObjectDefinition,
    IfcContext,
    IfcProject,
    IfcObject,
    IfcProduct,

    // Elements
    IfcElement,
    IfcBuildingElement,
    IfcWall,
    IfcWallStandardCase,
    IfcWallElementedCase,
    IfcSlab,
    IfcBeam,
    IfcColumn,
    IfcDoor,
    IfcWindow,
    IfcRoof,
    IfcStair,
    IfcStairFlight,
    IfcRamp,
    IfcRampFlight,
    IfcRailing,
    IfcCovering,
    IfcCurtainWall,
    IfcPlate,
    IfcMember,
    IfcFooting,
    IfcPile,
    IfcChimney,
    IfcShadingDevice,
    IfcBuildingElementProxy,
    IfcElementAssembly,

    // Features
    IfcFeatureElement,
    IfcFeatureElementSubtraction,
    IfcOpeningElement,

    // Furniture
    IfcFurnishingElement,
    IfcFurniture,

    // MEP
    IfcDistributionElement,
    IfcDistributionFlowElement,
    IfcFlowSegment,
    IfcFlowTerminal,
    IfcFlowFitting,
    IfcPipeSegment,
    IfcDuctSegment,
    IfcCableSegment,

    // Spatial structure
    IfcSpatialElement,
    IfcSpatialStructureElement,
    IfcSite,
    IfcBuilding,
    IfcBuildingStorey,
    IfcSpace,

    // Annotations
    IfcAnnotation,
    IfcGrid,

    // Property definitions
    IfcPropertyDefinition,
    IfcPropertySetDefinition,
    IfcPropertySet,
    IfcElementQuantity,
}

impl IfcClass {
    /// Every class in the table
    pub const ALL: &'static [IfcClass] = &[
        Self::IfcRoot,
        Self::IfcObjectDefinition,
        Self::IfcContext,
        Self::IfcProject,
        Self::IfcObject,
        Self::IfcProduct,
        Self::IfcElement,
        Self::IfcBuildingElement,
        Self::IfcWall,
        Self::IfcWallStandardCase,
        Self::IfcWallElementedCase,
        Self::IfcSlab,
        Self::IfcBeam,
        Self::IfcColumn,
        Self::IfcDoor,
        Self::IfcWindow,
        Self::IfcRoof,
        Self::IfcStair,
        Self::IfcStairFlight,
        Self::IfcRamp,
        Self::IfcRampFlight,
        Self::IfcRailing,
        Self::IfcCovering,
        Self::IfcCurtainWall,
        Self::IfcPlate,
        Self::IfcMember,
        Self::IfcFooting,
        Self::IfcPile,
        Self::IfcChimney,
        Self::IfcShadingDevice,
        Self::IfcBuildingElementProxy,
        Self::IfcElementAssembly,
        Self::IfcFeatureElement,
        Self::IfcFeatureElementSubtraction,
        Self::IfcOpeningElement,
        Self::IfcFurnishingElement,
        Self::IfcFurniture,
        Self::IfcDistributionElement,
        Self::IfcDistributionFlowElement,
        Self::IfcFlowSegment,
        Self::IfcFlowTerminal,
        Self::IfcFlowFitting,
        Self::IfcPipeSegment,
        Self::IfcDuctSegment,
        Self::IfcCableSegment,
        Self::IfcSpatialElement,
        Self::IfcSpatialStructureElement,
        Self::IfcSite,
        Self::IfcBuilding,
        Self::IfcBuildingStorey,
        Self::IfcSpace,
        Self::IfcAnnotation,
        Self::IfcGrid,
        Self::IfcPropertyDefinition,
        Self::IfcPropertySetDefinition,
        Self::IfcPropertySet,
        Self::IfcElementQuantity,
    ];

    /// Look up a class by name, ignoring ASCII case (`IFCWALL`, `IfcWall`).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|class| class.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical schema spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IfcRoot => "IfcRoot",
            Self::IfcObjectDefinition => "IfcObjectDefinition",
            Self::IfcContext => "IfcContext",
            Self::IfcProject => "IfcProject",
            Self::IfcObject => "IfcObject",
            Self::IfcProduct => "IfcProduct",
            Self::IfcElement => "IfcElement",
            Self::IfcBuildingElement => "IfcBuildingElement",
            Self::IfcWall => "IfcWall",
            Self::IfcWallStandardCase => "IfcWallStandardCase",
            Self::IfcWallElementedCase => "IfcWallElementedCase",
            Self::IfcSlab => "IfcSlab",
            Self::IfcBeam => "IfcBeam",
            Self::IfcColumn => "IfcColumn",
            Self::IfcDoor => "IfcDoor",
            Self::IfcWindow => "IfcWindow",
            Self::IfcRoof => "IfcRoof",
            Self::IfcStair => "IfcStair",
            Self::IfcStairFlight => "IfcStairFlight",
            Self::IfcRamp => "IfcRamp",
            Self::IfcRampFlight => "IfcRampFlight",
            Self::IfcRailing => "IfcRailing",
            Self::IfcCovering => "IfcCovering",
            Self::IfcCurtainWall => "IfcCurtainWall",
            Self::IfcPlate => "IfcPlate",
            Self::IfcMember => "IfcMember",
            Self::IfcFooting => "IfcFooting",
            Self::IfcPile => "IfcPile",
            Self::IfcChimney => "IfcChimney",
            Self::IfcShadingDevice => "IfcShadingDevice",
            Self::IfcBuildingElementProxy => "IfcBuildingElementProxy",
            Self::IfcElementAssembly => "IfcElementAssembly",
            Self::IfcFeatureElement => "IfcFeatureElement",
            Self::IfcFeatureElementSubtraction => "IfcFeatureElementSubtraction",
            Self::IfcOpeningElement => "IfcOpeningElement",
            Self::IfcFurnishingElement => "IfcFurnishingElement",
            Self::IfcFurniture => "IfcFurniture",
            Self::IfcDistributionElement => "IfcDistributionElement",
            Self::IfcDistributionFlowElement => "IfcDistributionFlowElement",
            Self::IfcFlowSegment => "IfcFlowSegment",
            Self::IfcFlowTerminal => "IfcFlowTerminal",
            Self::IfcFlowFitting => "IfcFlowFitting",
            Self::IfcPipeSegment => "IfcPipeSegment",
            Self::IfcDuctSegment => "IfcDuctSegment",
            Self::IfcCableSegment => "IfcCableSegment",
            Self::IfcSpatialElement => "IfcSpatialElement",
            Self::IfcSpatialStructureElement => "IfcSpatialStructureElement",
            Self::IfcSite => "IfcSite",
            Self::IfcBuilding => "IfcBuilding",
            Self::IfcBuildingStorey => "IfcBuildingStorey",
            Self::IfcSpace => "IfcSpace",
            Self::IfcAnnotation => "IfcAnnotation",
            Self::IfcGrid => "IfcGrid",
            Self::IfcPropertyDefinition => "IfcPropertyDefinition",
            Self::IfcPropertySetDefinition => "IfcPropertySetDefinition",
            Self::IfcPropertySet => "IfcPropertySet",
            Self::IfcElementQuantity => "IfcElementQuantity",
        }
    }

    /// Direct supertype, `None` for `IfcRoot`
    pub fn supertype(&self) -> Option<Self> {
        let parent = match self {
            Self::IfcRoot => return None,
            Self::IfcObjectDefinition | Self::IfcPropertyDefinition => Self::IfcRoot,
            Self::IfcContext | Self::IfcObject => Self::IfcObjectDefinition,
            Self::IfcProject => Self::IfcContext,
            Self::IfcProduct => Self::IfcObject,

            Self::IfcElement
            | Self::IfcSpatialElement
            | Self::IfcAnnotation
            | Self::IfcGrid => Self::IfcProduct,

            Self::IfcBuildingElement
            | Self::IfcFeatureElement
            | Self::IfcFurnishingElement
            | Self::IfcDistributionElement
            | Self::IfcElementAssembly => Self::IfcElement,

            Self::IfcWallStandardCase | Self::IfcWallElementedCase => Self::IfcWall,
            Self::IfcWall
            | Self::IfcSlab
            | Self::IfcBeam
            | Self::IfcColumn
            | Self::IfcDoor
            | Self::IfcWindow
            | Self::IfcRoof
            | Self::IfcStair
            | Self::IfcStairFlight
            | Self::IfcRamp
            | Self::IfcRampFlight
            | Self::IfcRailing
            | Self::IfcCovering
            | Self::IfcCurtainWall
            | Self::IfcPlate
            | Self::IfcMember
            | Self::IfcFooting
            | Self::IfcPile
            | Self::IfcChimney
            | Self::IfcShadingDevice
            | Self::IfcBuildingElementProxy => Self::IfcBuildingElement,

            Self::IfcFeatureElementSubtraction => Self::IfcFeatureElement,
            Self::IfcOpeningElement => Self::IfcFeatureElementSubtraction,

            Self::IfcFurniture => Self::IfcFurnishingElement,

            Self::IfcDistributionFlowElement => Self::IfcDistributionElement,
            Self::IfcFlowSegment | Self::IfcFlowTerminal | Self::IfcFlowFitting => {
                Self::IfcDistributionFlowElement
            }
            Self::IfcPipeSegment | Self::IfcDuctSegment | Self::IfcCableSegment => {
                Self::IfcFlowSegment
            }

            Self::IfcSpatialStructureElement => Self::IfcSpatialElement,
            Self::IfcSite | Self::IfcBuilding | Self::IfcBuildingStorey | Self::IfcSpace => {
                Self::IfcSpatialStructureElement
            }

            Self::IfcPropertySetDefinition => Self::IfcPropertyDefinition,
            Self::IfcPropertySet | Self::IfcElementQuantity => Self::IfcPropertySetDefinition,
        };
        Some(parent)
    }

    /// True if `self` is `other` or inherits from it
    pub fn is_subtype_of(&self, other: IfcClass) -> bool {
        let mut current = Some(*self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.supertype();
        }
        false
    }

    /// Check if this is a spatial structure element (site, building, storey, space)
    pub fn is_spatial_structure(&self) -> bool {
        self.is_subtype_of(Self::IfcSpatialStructureElement)
    }
}

impl fmt::Display for IfcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a declared type name satisfies a class filter.
///
/// Declared names outside the class table only match the filter by exact
/// (case-insensitive) name.
pub fn type_matches(declared: &str, filter: IfcClass) -> bool {
    match IfcClass::from_name(declared) {
        Some(class) => class.is_subtype_of(filter),
        None => declared.trim().eq_ignore_ascii_case(filter.as_str()),
    }
}
