// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! SPIR-V opcodes emitted by the transpiler.

spirv_enum! {
    /// Opcodes, with the capabilities the instruction itself requires.
    pub enum Op {
        Nop = 0,
        Source = 3,
        Name = 5,
        MemberName = 6,
        String = 7,
        Extension = 10,
        ExtInstImport = 11,
        ExtInst = 12,
        MemoryModel = 14,
        EntryPoint = 15,
        ExecutionMode = 16,
        Capability = 17,
        TypeVoid = 19,
        TypeBool = 20,
        TypeInt = 21,
        TypeFloat = 22,
        TypeVector = 23,
        TypeMatrix = 24: [Matrix],
        TypeArray = 28,
        TypeRuntimeArray = 29: [Shader],
        TypeStruct = 30,
        TypePointer = 32,
        TypeFunction = 33,
        ConstantTrue = 41,
        ConstantFalse = 42,
        Constant = 43,
        ConstantComposite = 44,
        ConstantNull = 46,
        Function = 54,
        FunctionParameter = 55,
        FunctionEnd = 56,
        FunctionCall = 57,
        Variable = 59,
        Load = 61,
        Store = 62,
        AccessChain = 65,
        Decorate = 71,
        MemberDecorate = 72,
        CompositeConstruct = 80,
        CompositeExtract = 81,
        Label = 248,
        Branch = 249,
        Kill = 252: [Shader],
        Return = 253,
        ReturnValue = 254,
        Unreachable = 255,
    }
}
