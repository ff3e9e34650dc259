// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Instruction operands and the SPIR-V enumerations the emitter uses.
//!
//! Every enumerant carries the capabilities it requires (any one of them
//! suffices) and the extensions it needs. Pushing an [`Operand::Enum`] into a
//! [`CodeBuffer`](super::CodeBuffer) records both.

use super::Capability;

/// A result ID. Zero is never a valid ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(pub u32);

impl Id {
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A SPIR-V enumeration usable as an operand.
pub trait EnumOperand: Copy {
    /// The operand word.
    fn value(self) -> u32;

    /// Capabilities of which any one enables the enumerant.
    fn capabilities(self) -> &'static [Capability];

    /// Extensions the enumerant needs.
    fn extensions(self) -> &'static [&'static str];
}

/// An enumerant with its requirements resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumerant {
    pub value: u32,
    pub capabilities: &'static [Capability],
    pub extensions: &'static [&'static str],
}

/// One operand of an instruction, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    /// A required ID; a null ID rejects the instruction.
    Id(Id),
    /// An ID that may be absent.
    OptionalId(Option<Id>),
    Literal(u32),
    OptionalLiteral(Option<u32>),
    /// A NUL-terminated string padded to a word boundary.
    String(&'a str),
    /// Zero or more required IDs.
    Ids(&'a [Id]),
    Literals(&'a [u32]),
    Enum(Enumerant),
    /// The operand of `OpCapability`. Declaring a capability requires nothing.
    Capability(Capability),
}

impl Operand<'_> {
    /// Wraps an enumeration value.
    pub fn enumerant<E: EnumOperand>(value: E) -> Self {
        Self::Enum(Enumerant {
            value: value.value(),
            capabilities: value.capabilities(),
            extensions: value.extensions(),
        })
    }

    /// Returns `true` if a required ID is null.
    #[must_use]
    pub fn has_null_id(&self) -> bool {
        match self {
            Self::Id(id) | Self::OptionalId(Some(id)) => id.is_null(),
            Self::Ids(ids) => ids.iter().any(|id| id.is_null()),
            _ => false,
        }
    }

    /// Number of words the operand occupies.
    #[must_use]
    pub fn word_count(&self) -> usize {
        match self {
            Self::Id(_) | Self::Literal(_) | Self::Enum(_) | Self::Capability(_) => 1,
            Self::OptionalId(id) => usize::from(id.is_some()),
            Self::OptionalLiteral(literal) => usize::from(literal.is_some()),
            Self::String(text) => text.len() / 4 + 1,
            Self::Ids(ids) => ids.len(),
            Self::Literals(literals) => literals.len(),
        }
    }

    /// Appends the operand's words to `words`.
    pub fn write(&self, words: &mut Vec<u32>) {
        match *self {
            Self::Id(id) | Self::OptionalId(Some(id)) => words.push(id.0),
            Self::Literal(value) | Self::OptionalLiteral(Some(value)) => words.push(value),
            Self::OptionalId(None) | Self::OptionalLiteral(None) => {}
            Self::String(text) => push_string(words, text),
            Self::Ids(ids) => words.extend(ids.iter().map(|id| id.0)),
            Self::Literals(literals) => words.extend_from_slice(literals),
            Self::Enum(enumerant) => words.push(enumerant.value),
            Self::Capability(capability) => words.push(capability.value()),
        }
    }
}

/// Appends `text` as a literal string: UTF-8 bytes, a NUL terminator and
/// zero padding, packed low byte first.
pub fn push_string(words: &mut Vec<u32>, text: &str) {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    for chunk in bytes.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        words.push(u32::from_le_bytes(word));
    }
}

macro_rules! enum_operands {
    ($($ty:ident),* $(,)?) => {
        $(
            impl EnumOperand for $ty {
                fn value(self) -> u32 {
                    $ty::value(self)
                }

                fn capabilities(self) -> &'static [Capability] {
                    $ty::capabilities(self)
                }

                fn extensions(self) -> &'static [&'static str] {
                    $ty::extensions(self)
                }
            }
        )*
    };
}

enum_operands!(
    ExecutionModel,
    AddressingModel,
    MemoryModel,
    ExecutionMode,
    StorageClass,
    Decoration,
    BuiltIn,
    FunctionControl,
);

spirv_enum! {
    /// Shader stage of an entry point.
    pub enum ExecutionModel {
        Vertex = 0: [Shader],
        TessellationControl = 1: [Tessellation],
        TessellationEvaluation = 2: [Tessellation],
        Geometry = 3: [Geometry],
        Fragment = 4: [Shader],
        GLCompute = 5: [Shader],
        Kernel = 6: [Kernel],
        RayGenerationKHR = 5313: [RayTracingKHR] ext ["SPV_KHR_ray_tracing"],
    }
}

spirv_enum! {
    pub enum AddressingModel {
        Logical = 0,
        Physical32 = 1: [Addresses],
        Physical64 = 2: [Addresses],
        PhysicalStorageBuffer64 = 5348: [PhysicalStorageBufferAddresses]
            ext ["SPV_KHR_physical_storage_buffer"],
    }
}

spirv_enum! {
    pub enum MemoryModel {
        Simple = 0: [Shader],
        GLSL450 = 1: [Shader],
        OpenCL = 2: [Kernel],
        Vulkan = 3: [VulkanMemoryModel],
    }
}

spirv_enum! {
    /// Execution modes. Modes with parameters take them as trailing literal
    /// operands.
    pub enum ExecutionMode {
        Invocations = 0: [Geometry],
        SpacingEqual = 1: [Tessellation],
        VertexOrderCw = 4: [Tessellation],
        PixelCenterInteger = 6: [Shader],
        OriginUpperLeft = 7: [Shader],
        OriginLowerLeft = 8: [Shader],
        EarlyFragmentTests = 9: [Shader],
        PointMode = 10: [Tessellation],
        DepthReplacing = 12: [Shader],
        LocalSize = 17,
        LocalSizeHint = 18: [Kernel],
        InputPoints = 19: [Geometry],
        Triangles = 22: [Geometry, Tessellation],
        OutputVertices = 26: [Geometry, Tessellation],
        OutputPoints = 27: [Geometry],
    }
}

spirv_enum! {
    pub enum StorageClass {
        UniformConstant = 0,
        Input = 1,
        Uniform = 2: [Shader],
        Output = 3: [Shader],
        Workgroup = 4,
        CrossWorkgroup = 5,
        Private = 6: [Shader],
        Function = 7,
        Generic = 8: [GenericPointer],
        PushConstant = 9: [Shader],
        AtomicCounter = 10: [AtomicStorage],
        Image = 11,
        StorageBuffer = 12: [Shader] ext ["SPV_KHR_storage_buffer_storage_class"],
        PhysicalStorageBuffer = 5349: [PhysicalStorageBufferAddresses]
            ext ["SPV_KHR_physical_storage_buffer"],
    }
}

spirv_enum! {
    /// Decorations. Decorations with parameters take them as trailing
    /// operands.
    pub enum Decoration {
        RelaxedPrecision = 0: [Shader],
        SpecId = 1: [Shader, Kernel],
        Block = 2: [Shader],
        BufferBlock = 3: [Shader],
        RowMajor = 4: [Matrix],
        ColMajor = 5: [Matrix],
        ArrayStride = 6: [Shader],
        MatrixStride = 7: [Matrix],
        BuiltIn = 11,
        NoPerspective = 13: [Shader],
        Flat = 14: [Shader],
        Invariant = 18: [Shader],
        Location = 30: [Shader],
        Component = 31: [Shader],
        Index = 32: [Shader],
        Binding = 33: [Shader],
        DescriptorSet = 34: [Shader],
        Offset = 35: [Shader],
        NonUniform = 5300: [ShaderNonUniform],
    }
}

spirv_enum! {
    pub enum BuiltIn {
        Position = 0: [Shader],
        PointSize = 1: [Shader],
        ClipDistance = 3: [ClipDistance],
        CullDistance = 4: [CullDistance],
        VertexId = 5: [Shader],
        InstanceId = 6: [Shader],
        PrimitiveId = 7: [Geometry, Tessellation, RayTracingKHR],
        InvocationId = 8: [Geometry, Tessellation],
        Layer = 9: [Geometry],
        ViewportIndex = 10: [MultiViewport],
        TessLevelOuter = 11: [Tessellation],
        TessLevelInner = 12: [Tessellation],
        FragCoord = 15: [Shader],
        PointCoord = 16: [Shader],
        FrontFacing = 17: [Shader],
        SampleId = 18: [SampleRateShading],
        FragDepth = 22: [Shader],
        NumWorkgroups = 24,
        WorkgroupSize = 25,
        WorkgroupId = 26,
        LocalInvocationId = 27,
        GlobalInvocationId = 28,
        LocalInvocationIndex = 29,
        VertexIndex = 42: [Shader],
        InstanceIndex = 43: [Shader],
        BaseVertex = 4424: [DrawParameters] ext ["SPV_KHR_shader_draw_parameters"],
        BaseInstance = 4425: [DrawParameters] ext ["SPV_KHR_shader_draw_parameters"],
        DrawIndex = 4426: [DrawParameters] ext ["SPV_KHR_shader_draw_parameters"],
        ViewIndex = 4440: [MultiView] ext ["SPV_KHR_multiview"],
    }
}

spirv_enum! {
    /// Function control mask bits.
    pub enum FunctionControl {
        None = 0,
        Inline = 1,
        DontInline = 2,
        Pure = 4,
        Const = 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(operand: Operand<'_>) -> Vec<u32> {
        let mut words = Vec::new();
        operand.write(&mut words);
        assert_eq!(words.len(), operand.word_count());
        words
    }

    #[test]
    fn strings_are_nul_terminated_and_padded() {
        assert_eq!(words(Operand::String("")), [0]);
        assert_eq!(words(Operand::String("abc")), [0x0063_6261]);
        assert_eq!(words(Operand::String("abcd")), [0x6463_6261, 0]);
        assert_eq!(words(Operand::String("main")), [0x6e69_616d, 0]);
        assert_eq!(words(Operand::String("GLSL450")).len(), 2);
    }

    #[test]
    fn optional_operands_may_be_absent() {
        assert!(words(Operand::OptionalId(None)).is_empty());
        assert!(words(Operand::OptionalLiteral(None)).is_empty());
        assert_eq!(words(Operand::OptionalId(Some(Id(4)))), [4]);
        assert_eq!(words(Operand::OptionalLiteral(Some(9))), [9]);
    }

    #[test]
    fn repeated_operands_contribute_each_word() {
        assert_eq!(words(Operand::Ids(&[Id(1), Id(2), Id(3)])), [1, 2, 3]);
        assert_eq!(words(Operand::Literals(&[])), Vec::<u32>::new());
    }

    #[test]
    fn null_ids_are_detected() {
        assert!(Operand::Id(Id(0)).has_null_id());
        assert!(Operand::OptionalId(Some(Id(0))).has_null_id());
        assert!(Operand::Ids(&[Id(3), Id(0)]).has_null_id());
        assert!(!Operand::OptionalId(None).has_null_id());
        assert!(!Operand::Literal(0).has_null_id());
    }

    #[test]
    fn enumerants_carry_requirements() {
        let Operand::Enum(enumerant) = Operand::enumerant(BuiltIn::DrawIndex) else {
            panic!("expected an enum operand");
        };
        assert_eq!(enumerant.value, 4426);
        assert_eq!(enumerant.capabilities, [Capability::DrawParameters]);
        assert_eq!(enumerant.extensions, ["SPV_KHR_shader_draw_parameters"]);
    }

    #[test]
    fn enum_values_round_trip() {
        for model in ExecutionModel::ALL {
            assert_eq!(ExecutionModel::from_value(model.value()), Some(*model));
        }
        assert_eq!(StorageClass::from_value(3), Some(StorageClass::Output));
        assert_eq!(Decoration::from_value(9999), None);
    }
}
