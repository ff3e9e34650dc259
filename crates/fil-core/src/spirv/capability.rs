// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! SPIR-V capabilities and the bookkeeping of what a module requires.
//!
//! Declaring a capability implicitly declares every capability it depends
//! on (`Shader` declares `Matrix`, `Geometry` declares `Shader`, and so on).
//! [`CapabilitySet`] uses that relation to keep its contents minimal: a
//! requirement already covered by a declared capability adds nothing, and a
//! newly added capability absorbs the ones it covers.

use std::collections::BTreeSet;

use ecow::EcoString;
use tracing::trace;

/// SPIR-V capabilities known to the emitter.
///
/// Variants are declared in ascending value order, so the derived ordering
/// is the numeric one used when capabilities are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum Capability {
    Matrix = 0,
    Shader = 1,
    Geometry = 2,
    Tessellation = 3,
    Addresses = 4,
    Linkage = 5,
    Kernel = 6,
    Vector16 = 7,
    Float16Buffer = 8,
    Float16 = 9,
    Float64 = 10,
    Int64 = 11,
    Int64Atomics = 12,
    ImageBasic = 13,
    ImageReadWrite = 14,
    ImageMipmap = 15,
    Pipes = 17,
    Groups = 18,
    DeviceEnqueue = 19,
    LiteralSampler = 20,
    AtomicStorage = 21,
    Int16 = 22,
    TessellationPointSize = 23,
    GeometryPointSize = 24,
    ImageGatherExtended = 25,
    StorageImageMultisample = 27,
    UniformBufferArrayDynamicIndexing = 28,
    SampledImageArrayDynamicIndexing = 29,
    StorageBufferArrayDynamicIndexing = 30,
    StorageImageArrayDynamicIndexing = 31,
    ClipDistance = 32,
    CullDistance = 33,
    ImageCubeArray = 34,
    SampleRateShading = 35,
    ImageRect = 36,
    SampledRect = 37,
    GenericPointer = 38,
    Int8 = 39,
    InputAttachment = 40,
    SparseResidency = 41,
    MinLod = 42,
    Sampled1D = 43,
    Image1D = 44,
    SampledCubeArray = 45,
    SampledBuffer = 46,
    ImageBuffer = 47,
    ImageMSArray = 48,
    StorageImageExtendedFormats = 49,
    ImageQuery = 50,
    DerivativeControl = 51,
    InterpolationFunction = 52,
    TransformFeedback = 53,
    GeometryStreams = 54,
    StorageImageReadWithoutFormat = 55,
    StorageImageWriteWithoutFormat = 56,
    MultiViewport = 57,
    DrawParameters = 4427,
    StorageBuffer16BitAccess = 4433,
    MultiView = 4439,
    VariablePointersStorageBuffer = 4441,
    VariablePointers = 4442,
    RayQueryKHR = 4472,
    RayTraversalPrimitiveCullingKHR = 4478,
    RayTracingKHR = 4479,
    ShaderNonUniform = 5301,
    RuntimeDescriptorArray = 5302,
    VulkanMemoryModel = 5345,
    PhysicalStorageBufferAddresses = 5347,
}

impl Capability {
    /// The value written after `OpCapability`.
    #[must_use]
    pub const fn value(self) -> u32 {
        self as u32
    }

    /// Capabilities declared implicitly by declaring `self`.
    #[must_use]
    pub const fn implied(self) -> &'static [Capability] {
        use Capability as C;
        match self {
            C::Shader => &[C::Matrix],
            C::Geometry
            | C::Tessellation
            | C::AtomicStorage
            | C::ImageGatherExtended
            | C::StorageImageMultisample
            | C::UniformBufferArrayDynamicIndexing
            | C::SampledImageArrayDynamicIndexing
            | C::StorageBufferArrayDynamicIndexing
            | C::StorageImageArrayDynamicIndexing
            | C::ClipDistance
            | C::CullDistance
            | C::SampleRateShading
            | C::SampledRect
            | C::InputAttachment
            | C::SparseResidency
            | C::MinLod
            | C::ImageMSArray
            | C::StorageImageExtendedFormats
            | C::ImageQuery
            | C::DerivativeControl
            | C::InterpolationFunction
            | C::TransformFeedback
            | C::StorageImageReadWithoutFormat
            | C::StorageImageWriteWithoutFormat
            | C::DrawParameters
            | C::MultiView
            | C::VariablePointersStorageBuffer
            | C::RayQueryKHR
            | C::RayTracingKHR
            | C::ShaderNonUniform
            | C::RuntimeDescriptorArray
            | C::PhysicalStorageBufferAddresses => &[C::Shader],
            C::Vector16
            | C::Float16Buffer
            | C::ImageBasic
            | C::Pipes
            | C::DeviceEnqueue
            | C::LiteralSampler => &[C::Kernel],
            C::Int64Atomics => &[C::Int64],
            C::ImageReadWrite | C::ImageMipmap => &[C::ImageBasic],
            C::TessellationPointSize => &[C::Tessellation],
            C::GeometryPointSize | C::GeometryStreams | C::MultiViewport => &[C::Geometry],
            C::ImageCubeArray => &[C::SampledCubeArray],
            C::ImageRect => &[C::SampledRect],
            C::GenericPointer => &[C::Addresses],
            C::ImageBuffer => &[C::SampledBuffer],
            C::VariablePointers => &[C::VariablePointersStorageBuffer],
            C::RayTraversalPrimitiveCullingKHR => &[C::RayQueryKHR, C::RayTracingKHR],
            C::Matrix
            | C::Addresses
            | C::Linkage
            | C::Kernel
            | C::Float16
            | C::Float64
            | C::Int64
            | C::Groups
            | C::Int16
            | C::Int8
            | C::Sampled1D
            | C::Image1D
            | C::SampledCubeArray
            | C::SampledBuffer
            | C::StorageBuffer16BitAccess
            | C::VulkanMemoryModel => &[],
        }
    }

    /// Extensions a module must enable to declare `self`.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::DrawParameters => &["SPV_KHR_shader_draw_parameters"],
            Self::StorageBuffer16BitAccess => &["SPV_KHR_16bit_storage"],
            Self::MultiView => &["SPV_KHR_multiview"],
            Self::VariablePointersStorageBuffer | Self::VariablePointers => {
                &["SPV_KHR_variable_pointers"]
            }
            Self::RayQueryKHR | Self::RayTraversalPrimitiveCullingKHR => &["SPV_KHR_ray_query"],
            Self::RayTracingKHR => &["SPV_KHR_ray_tracing"],
            Self::ShaderNonUniform | Self::RuntimeDescriptorArray => {
                &["SPV_EXT_descriptor_indexing"]
            }
            Self::VulkanMemoryModel => &["SPV_KHR_vulkan_memory_model"],
            Self::PhysicalStorageBufferAddresses => &["SPV_KHR_physical_storage_buffer"],
            _ => &[],
        }
    }

    /// Extensions needed by `self` and every capability it implies.
    #[must_use]
    pub fn extensions_with_implied(self) -> BTreeSet<&'static str> {
        let mut extensions: BTreeSet<&'static str> = self.extensions().iter().copied().collect();
        for implied in self.implied() {
            extensions.extend(implied.extensions_with_implied());
        }
        extensions
    }

    /// Returns `true` if declaring `self` also declares `other`, directly or
    /// through a chain of implications. A capability implies itself.
    #[must_use]
    pub fn implies(self, other: Capability) -> bool {
        self == other || self.implied().iter().any(|c| c.implies(other))
    }
}

/// A minimal set of declared capabilities.
///
/// No member implies another member. Iteration is in ascending value order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    declared: BTreeSet<Capability>,
}

impl CapabilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a declared capability implies `capability`.
    #[must_use]
    pub fn satisfies(&self, capability: Capability) -> bool {
        self.declared.iter().any(|c| c.implies(capability))
    }

    /// Declares `capability`, dropping the members it implies.
    ///
    /// Returns `false` if the set already satisfied it.
    pub fn insert(&mut self, capability: Capability) -> bool {
        if self.satisfies(capability) {
            trace!(?capability, "capability already declared");
            return false;
        }
        self.declared.retain(|c| {
            let subsumed = capability.implies(*c);
            if subsumed {
                trace!(?capability, absorbed = ?c, "capability subsumed");
            }
            !subsumed
        });
        self.declared.insert(capability);
        true
    }

    /// Satisfies a requirement for any one of `alternatives`.
    ///
    /// When no alternative is satisfied yet the first one is declared and
    /// returned. An empty list is always satisfied.
    pub fn require_any(&mut self, alternatives: &[Capability]) -> Option<Capability> {
        if alternatives.iter().any(|c| self.satisfies(*c)) {
            return None;
        }
        let first = *alternatives.first()?;
        self.insert(first);
        Some(first)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.declared.contains(&capability)
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.declared.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::new();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

/// Capabilities and extensions accumulated while emitting code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub capabilities: CapabilitySet,
    /// Extension names, kept sorted.
    pub extensions: BTreeSet<EcoString>,
}

impl Requirements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a requirement for any one of `alternatives`, enabling the
    /// extensions of the capability declared for it and of those it implies.
    pub fn require_any(&mut self, alternatives: &[Capability]) {
        if let Some(declared) = self.capabilities.require_any(alternatives) {
            let extensions: Vec<&str> = declared.extensions_with_implied().into_iter().collect();
            self.add_extensions(&extensions);
        }
    }

    pub fn add_extensions(&mut self, extensions: &[&str]) {
        for extension in extensions {
            if !self.extensions.contains(*extension) {
                self.extensions.insert(EcoString::from(*extension));
            }
        }
    }

    /// Folds `other` into `self`, keeping the capability set minimal.
    pub fn merge(&mut self, other: &Requirements) {
        for capability in other.capabilities.iter() {
            self.capabilities.insert(capability);
        }
        self.extensions.extend(other.extensions.iter().cloned());
    }
}
