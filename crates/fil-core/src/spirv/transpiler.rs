// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Translation of a FIL binary into a SPIR-V module.
//!
//! Every IL function becomes a SPIR-V function and every entrypoint becomes
//! a `void()` function plus an `OpEntryPoint` whose interface holds one
//! `Input` variable per input and one `Output` variable per output, each
//! decorated with its position as `Location`.
//!
//! Problems are reported as messages anchored at the start of the binary's
//! file; the transpiler always finishes and returns a module.

use std::collections::HashMap;

use tracing::{debug, instrument};

use super::{
    Decoration, ExecutionMode, ExecutionModel, FunctionControl, Id, Module, Op, Operand,
    StorageClass,
};
use crate::diagnostics::{Message, MessageSink};
use crate::il::{
    BuiltinType, CodeRange, EntrypointKind, IlBinary, IlOpcode, Parameter, ParameterQualifier,
    TypeId, instructions,
};
use crate::source_analysis::{FileId, SourcePoint, SourceSpan};

/// Settings for [`transpile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranspileOptions {
    /// SPIR-V `(major, minor)` version written into the header.
    pub spirv_version: (u8, u8),
    /// Emit `OpName` for functions and entrypoints.
    pub emit_names: bool,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            spirv_version: (1, 0),
            emit_names: false,
        }
    }
}

/// Translates `il` into SPIR-V words.
///
/// Invalid IL is reported as a single error and produces an empty vector.
#[instrument(skip_all, fields(
    entrypoints = il.entrypoints.len(),
    functions = il.functions.len(),
))]
pub fn transpile(
    il: &IlBinary,
    options: TranspileOptions,
    file: FileId,
    sink: &mut impl MessageSink,
) -> Vec<u32> {
    let span = SourceSpan::at(SourcePoint::file_start(file));
    if let Err(error) = il.validate() {
        sink.report(Message::error(span, format!("Invalid FIL binary: {error}")));
        return Vec::new();
    }
    let mut transpiler = Transpiler {
        il,
        options,
        span,
        sink,
        module: Module::new(options.spirv_version),
        types: HashMap::new(),
        function_types: HashMap::new(),
        pointers: HashMap::new(),
        functions: Vec::new(),
    };
    transpiler.run();
    transpiler.module.assemble()
}

/// A declared IL function.
#[derive(Debug, Clone, Copy)]
struct Callee {
    id: Id,
    return_type: Id,
    parameters: usize,
}

/// What a body may do, and how it must end.
#[derive(Debug, Clone, Copy)]
struct BodyContext<'n> {
    name: &'n str,
    return_type: BuiltinType,
    kind: Option<EntrypointKind>,
}

struct Transpiler<'a, S> {
    il: &'a IlBinary,
    options: TranspileOptions,
    span: SourceSpan,
    sink: &'a mut S,
    module: Module,
    types: HashMap<BuiltinType, Id>,
    function_types: HashMap<(Id, Vec<Id>), Id>,
    pointers: HashMap<(StorageClass, Id), Id>,
    functions: Vec<Callee>,
}

impl<S: MessageSink> Transpiler<'_, S> {
    fn run(&mut self) {
        let il = self.il;
        // Declare first so calls can refer to any function.
        for function in &il.functions {
            let return_type = self.type_id(function.return_type);
            let id = self.module.next_id();
            self.functions.push(Callee {
                id,
                return_type,
                parameters: function.parameters.len(),
            });
        }
        for (function, callee) in il.functions.iter().zip(self.functions.clone()) {
            let name = il.name(function.name).unwrap_or_default();
            debug!(name, "emitting function");
            self.name(callee.id, name);
            let return_type = function.return_type.builtin().unwrap_or(BuiltinType::Void);
            self.function(
                callee.id,
                &function.parameters,
                function.code,
                BodyContext {
                    name,
                    return_type,
                    kind: None,
                },
            );
        }
        for entrypoint in &il.entrypoints {
            let name = il.name(entrypoint.name).unwrap_or_default();
            debug!(name, kind = ?entrypoint.kind, "emitting entrypoint");
            self.entrypoint(
                entrypoint.kind,
                name,
                &entrypoint.inputs,
                &entrypoint.outputs,
                entrypoint.code,
            );
        }
    }

    fn error(&mut self, text: String) {
        self.sink.report(Message::error(self.span, text));
    }

    fn warning(&mut self, text: String) {
        self.sink.report(Message::warning(self.span, text));
    }

    fn name(&mut self, id: Id, name: &str) {
        if self.options.emit_names {
            self.module
                .debug
                .push(Op::Name, &[Operand::Id(id), Operand::String(name)]);
        }
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn builtin(&mut self, ty: BuiltinType) -> Id {
        if let Some(id) = self.types.get(&ty) {
            return *id;
        }
        let id = match ty {
            BuiltinType::Void => self.declare(Op::TypeVoid, &[]),
            BuiltinType::Bool => self.declare(Op::TypeBool, &[]),
            BuiltinType::Int | BuiltinType::Uint => self.declare(
                Op::TypeInt,
                &[
                    Operand::Literal(32),
                    Operand::Literal(u32::from(ty == BuiltinType::Int)),
                ],
            ),
            BuiltinType::Float => self.declare(Op::TypeFloat, &[Operand::Literal(32)]),
            BuiltinType::Vec2 | BuiltinType::Vec3 | BuiltinType::Vec4 => {
                let float = self.builtin(BuiltinType::Float);
                let size = ty.vector_size().unwrap_or(4);
                self.declare(Op::TypeVector, &[Operand::Id(float), Operand::Literal(size)])
            }
            BuiltinType::Mat4 => {
                let column = self.builtin(BuiltinType::Vec4);
                self.declare(Op::TypeMatrix, &[Operand::Id(column), Operand::Literal(4)])
            }
        };
        self.types.insert(ty, id);
        id
    }

    /// Pushes a global whose first operand is a fresh result id.
    fn declare(&mut self, op: Op, operands: &[Operand<'_>]) -> Id {
        let id = self.module.next_id();
        let mut all = Vec::with_capacity(operands.len() + 1);
        all.push(Operand::Id(id));
        all.extend_from_slice(operands);
        self.module.globals.push(op, &all);
        id
    }

    /// Resolves an IL type. The binary is validated first, so only builtin
    /// ids reach this point.
    fn type_id(&mut self, type_id: TypeId) -> Id {
        let ty = type_id.builtin().unwrap_or(BuiltinType::Void);
        self.builtin(ty)
    }

    fn pointer(&mut self, storage: StorageClass, pointee: Id) -> Id {
        if let Some(id) = self.pointers.get(&(storage, pointee)) {
            return *id;
        }
        let id = self.declare(
            Op::TypePointer,
            &[Operand::enumerant(storage), Operand::Id(pointee)],
        );
        self.pointers.insert((storage, pointee), id);
        id
    }

    fn function_type(&mut self, return_type: Id, parameters: Vec<Id>) -> Id {
        let key = (return_type, parameters);
        if let Some(id) = self.function_types.get(&key) {
            return *id;
        }
        let id = self.declare(Op::TypeFunction, &[Operand::Id(key.0), Operand::Ids(&key.1)]);
        self.function_types.insert(key, id);
        id
    }

    /// `out` and `inout` parameters are passed by pointer.
    fn parameter_type(&mut self, parameter: &Parameter) -> Id {
        let value = self.type_id(parameter.type_id);
        let by_reference = parameter
            .qualifiers
            .iter()
            .any(|q| matches!(q, ParameterQualifier::Out | ParameterQualifier::InOut));
        if by_reference {
            self.pointer(StorageClass::Function, value)
        } else {
            value
        }
    }

    // ------------------------------------------------------------------------
    // Functions and entrypoints
    // ------------------------------------------------------------------------

    fn function(&mut self, id: Id, parameters: &[Parameter], code: CodeRange, context: BodyContext<'_>) {
        let return_type = self.builtin(context.return_type);
        let parameter_types: Vec<Id> = parameters.iter().map(|p| self.parameter_type(p)).collect();
        let function_type = self.function_type(return_type, parameter_types.clone());

        self.module.functions.push(
            Op::Function,
            &[
                Operand::Id(return_type),
                Operand::Id(id),
                Operand::enumerant(FunctionControl::None),
                Operand::Id(function_type),
            ],
        );
        for parameter_type in parameter_types {
            let parameter = self.module.next_id();
            self.module.functions.push(
                Op::FunctionParameter,
                &[Operand::Id(parameter_type), Operand::Id(parameter)],
            );
        }
        let label = self.module.next_id();
        self.module.functions.push(Op::Label, &[Operand::Id(label)]);
        self.body(code, context);
        self.module.functions.push(Op::FunctionEnd, &[]);
    }

    fn body(&mut self, code: CodeRange, context: BodyContext<'_>) {
        let il = self.il;
        let words = il.code_words(code).unwrap_or_default();
        let mut terminated = false;
        for instruction in instructions(words) {
            let Ok(instruction) = instruction else {
                break;
            };
            if terminated {
                self.warning(format!(
                    "Instructions after the end of `{}` are ignored",
                    context.name
                ));
                break;
            }
            match instruction.opcode {
                IlOpcode::Nop => {}
                IlOpcode::Return => {
                    self.return_from(context);
                    terminated = true;
                }
                IlOpcode::Discard => {
                    if context
                        .kind
                        .is_some_and(|kind| kind != EntrypointKind::Fragment)
                    {
                        self.error(format!(
                            "Discard in `{}` is only valid in fragment entrypoints",
                            context.name
                        ));
                    }
                    self.module.functions.push(Op::Kill, &[]);
                    terminated = true;
                }
                IlOpcode::Call => {
                    let index = instruction.operands.first().copied().unwrap_or_default();
                    self.call(context.name, index);
                }
            }
        }
        if !terminated {
            self.return_from(context);
        }
    }

    fn return_from(&mut self, context: BodyContext<'_>) {
        if context.return_type == BuiltinType::Void {
            self.module.functions.push(Op::Return, &[]);
        } else {
            self.error(format!(
                "`{}` must return a value of type {}, but the IL cannot carry return values",
                context.name,
                context.return_type.id()
            ));
            self.module.functions.push(Op::Unreachable, &[]);
        }
    }

    fn call(&mut self, caller: &str, index: u32) {
        let il = self.il;
        let Some(position) = usize::try_from(index).ok() else {
            return;
        };
        let Some(callee) = self.functions.get(position).copied() else {
            return;
        };
        if callee.parameters > 0 {
            let name = il
                .functions
                .get(position)
                .and_then(|f| il.name(f.name))
                .unwrap_or_default();
            self.error(format!(
                "`{caller}` calls `{name}` without its {} arguments",
                callee.parameters
            ));
            return;
        }
        let result = self.module.next_id();
        self.module.functions.push(
            Op::FunctionCall,
            &[
                Operand::Id(callee.return_type),
                Operand::Id(result),
                Operand::Id(callee.id),
            ],
        );
    }

    fn entrypoint(
        &mut self,
        kind: EntrypointKind,
        name: &str,
        inputs: &[Parameter],
        outputs: &[Parameter],
        code: CodeRange,
    ) {
        let id = self.module.next_id();
        self.name(id, name);

        let mut interface = Vec::with_capacity(inputs.len() + outputs.len());
        for (storage, parameters) in [(StorageClass::Input, inputs), (StorageClass::Output, outputs)] {
            for (location, parameter) in (0u32..).zip(parameters) {
                if parameter.type_id.builtin() == Some(BuiltinType::Void) {
                    self.error(format!(
                        "Entrypoint `{name}` has a {storage:?} of type Void"
                    ));
                    continue;
                }
                interface.push(self.interface_variable(storage, parameter, location));
            }
        }

        self.module.entry_points.push(
            Op::EntryPoint,
            &[
                Operand::enumerant(execution_model(kind)),
                Operand::Id(id),
                Operand::String(name),
                Operand::Ids(&interface),
            ],
        );
        match kind {
            EntrypointKind::Fragment => {
                self.module.execution_modes.push(
                    Op::ExecutionMode,
                    &[Operand::Id(id), Operand::enumerant(ExecutionMode::OriginUpperLeft)],
                );
            }
            EntrypointKind::Compute => {
                self.module.execution_modes.push(
                    Op::ExecutionMode,
                    &[
                        Operand::Id(id),
                        Operand::enumerant(ExecutionMode::LocalSize),
                        Operand::Literals(&[1, 1, 1]),
                    ],
                );
            }
            _ => {}
        }

        self.function(
            id,
            &[],
            code,
            BodyContext {
                name,
                return_type: BuiltinType::Void,
                kind: Some(kind),
            },
        );
    }

    fn interface_variable(&mut self, storage: StorageClass, parameter: &Parameter, location: u32) -> Id {
        let pointee = self.type_id(parameter.type_id);
        let pointer = self.pointer(storage, pointee);
        let variable = self.module.next_id();
        self.module.globals.push(
            Op::Variable,
            &[
                Operand::Id(pointer),
                Operand::Id(variable),
                Operand::enumerant(storage),
            ],
        );
        self.module.annotations.push(
            Op::Decorate,
            &[
                Operand::Id(variable),
                Operand::enumerant(Decoration::Location),
                Operand::Literal(location),
            ],
        );
        variable
    }
}

fn execution_model(kind: EntrypointKind) -> ExecutionModel {
    match kind {
        EntrypointKind::Vertex => ExecutionModel::Vertex,
        EntrypointKind::TessellationControl => ExecutionModel::TessellationControl,
        EntrypointKind::TessellationEvaluation => ExecutionModel::TessellationEvaluation,
        EntrypointKind::Geometry => ExecutionModel::Geometry,
        EntrypointKind::Fragment => ExecutionModel::Fragment,
        EntrypointKind::Compute => ExecutionModel::GLCompute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::{call_body, push_instruction};
    use crate::spirv::{Capability, SPIRV_MAGIC};

    /// `(opcode, operands)` for every instruction after the header.
    fn decode(words: &[u32]) -> Vec<(u32, Vec<u32>)> {
        let mut out = Vec::new();
        let mut at = 5;
        while at < words.len() {
            let count = (words[at] >> 16) as usize;
            out.push((words[at] & 0xffff, words[at + 1..at + count].to_vec()));
            at += count;
        }
        out
    }

    fn with(words: &[u32], op: Op) -> Vec<Vec<u32>> {
        decode(words)
            .into_iter()
            .filter(|(code, _)| *code == op.value())
            .map(|(_, operands)| operands)
            .collect()
    }

    fn run(il: &IlBinary, options: TranspileOptions) -> (Vec<u32>, Vec<Message>) {
        let mut messages = Vec::new();
        let words = transpile(il, options, FileId(0), &mut messages);
        (words, messages)
    }

    fn fragment(inputs: usize, outputs: usize) -> IlBinary {
        let mut il = IlBinary::new();
        let helper = il.add_function("helper", BuiltinType::Void.id(), Vec::new(), &call_body(&[]));
        let vec4 = || Parameter::new(BuiltinType::Vec4.id(), [ParameterQualifier::In]);
        il.add_entrypoint(
            EntrypointKind::Fragment,
            "main",
            (0..inputs).map(|_| vec4()).collect(),
            (0..outputs).map(|_| vec4()).collect(),
            &call_body(&[helper, helper]),
        );
        il
    }

    #[test]
    fn fragment_module_shape() {
        let (words, messages) = run(&fragment(2, 1), TranspileOptions::default());
        assert!(messages.is_empty(), "{messages:?}");
        assert_eq!(words[0], SPIRV_MAGIC);
        assert_eq!(words[1], 0x0001_0000);

        assert_eq!(with(&words, Op::Capability), [vec![Capability::Shader.value()]]);
        assert_eq!(with(&words, Op::MemoryModel), [vec![0, 1]]);

        let entry = &with(&words, Op::EntryPoint)[0];
        assert_eq!(entry[0], ExecutionModel::Fragment.value());
        assert_eq!(entry.len(), 2 + 2 + 3);

        let modes = with(&words, Op::ExecutionMode);
        assert_eq!(modes, [vec![entry[1], ExecutionMode::OriginUpperLeft.value()]]);

        let locations: Vec<u32> = with(&words, Op::Decorate).iter().map(|d| d[2]).collect();
        assert_eq!(locations, [0, 1, 0]);
        assert_eq!(with(&words, Op::FunctionCall).len(), 2);
        assert!(with(&words, Op::Name).is_empty());
    }

    #[test]
    fn types_are_declared_once() {
        let (words, _) = run(&fragment(2, 2), TranspileOptions::default());
        assert_eq!(with(&words, Op::TypeVoid).len(), 1);
        assert_eq!(with(&words, Op::TypeFloat).len(), 1);
        assert_eq!(with(&words, Op::TypeVector).len(), 1);
        assert_eq!(with(&words, Op::TypeFunction).len(), 1);
        // One pointer per storage class.
        assert_eq!(with(&words, Op::TypePointer).len(), 2);
    }

    #[test]
    fn every_id_is_below_the_bound() {
        let (words, _) = run(&fragment(1, 1), TranspileOptions::default());
        let bound = words[3];
        for id in with(&words, Op::Variable).iter().map(|v| v[1]) {
            assert!(id > 0 && id < bound);
        }
        for function in with(&words, Op::Function) {
            assert!(function[1] < bound && function[3] < bound);
        }
    }

    #[test]
    fn compute_entry_gets_local_size() {
        let mut il = IlBinary::new();
        il.add_entrypoint(EntrypointKind::Compute, "cs", Vec::new(), Vec::new(), &call_body(&[]));
        let (words, messages) = run(&il, TranspileOptions::default());
        assert!(messages.is_empty());
        let modes = with(&words, Op::ExecutionMode);
        assert_eq!(modes[0][1..], [ExecutionMode::LocalSize.value(), 1, 1, 1]);
        assert_eq!(with(&words, Op::EntryPoint)[0][0], ExecutionModel::GLCompute.value());
    }

    #[test]
    fn names_are_emitted_on_request() {
        let options = TranspileOptions {
            spirv_version: (1, 3),
            emit_names: true,
        };
        let (words, _) = run(&fragment(0, 0), options);
        assert_eq!(words[1], 0x0001_0300);
        assert_eq!(with(&words, Op::Name).len(), 2);
    }

    #[test]
    fn matrix_types_require_only_shader() {
        let mut il = IlBinary::new();
        il.add_entrypoint(
            EntrypointKind::Vertex,
            "vs",
            vec![Parameter::new(BuiltinType::Mat4.id(), [])],
            Vec::new(),
            &call_body(&[]),
        );
        let (words, _) = run(&il, TranspileOptions::default());
        assert_eq!(with(&words, Op::TypeMatrix).len(), 1);
        assert_eq!(with(&words, Op::Capability), [vec![Capability::Shader.value()]]);
    }

    #[test]
    fn return_from_non_void_function_is_an_error() {
        let mut il = IlBinary::new();
        il.add_function("value", BuiltinType::Float.id(), Vec::new(), &call_body(&[]));
        let (words, messages) = run(&il, TranspileOptions::default());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_error());
        assert!(messages[0].text.contains("Float"), "{}", messages[0].text);
        assert_eq!(with(&words, Op::Unreachable).len(), 1);
    }

    #[test]
    fn discard_outside_fragment_is_an_error() {
        let mut il = IlBinary::new();
        let mut body = Vec::new();
        push_instruction(&mut body, IlOpcode::Discard, &[]);
        il.add_entrypoint(EntrypointKind::Vertex, "vs", Vec::new(), Vec::new(), &body);
        let (words, messages) = run(&il, TranspileOptions::default());
        assert_eq!(messages.len(), 1);
        assert_eq!(with(&words, Op::Kill).len(), 1);
        assert!(with(&words, Op::Return).is_empty());
    }

    #[test]
    fn instructions_after_return_are_ignored() {
        let mut il = IlBinary::new();
        let mut body = call_body(&[]);
        push_instruction(&mut body, IlOpcode::Nop, &[]);
        il.add_function("f", BuiltinType::Void.id(), Vec::new(), &body);
        let (words, messages) = run(&il, TranspileOptions::default());
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].is_error());
        assert_eq!(with(&words, Op::Return).len(), 1);
    }

    #[test]
    fn calls_cannot_pass_arguments() {
        let mut il = IlBinary::new();
        let callee = il.add_function(
            "scale",
            BuiltinType::Void.id(),
            vec![Parameter::new(BuiltinType::Float.id(), [])],
            &call_body(&[]),
        );
        il.add_function("f", BuiltinType::Void.id(), Vec::new(), &call_body(&[callee]));
        let (words, messages) = run(&il, TranspileOptions::default());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("`scale`"));
        assert!(with(&words, Op::FunctionCall).is_empty());
        assert_eq!(with(&words, Op::FunctionParameter).len(), 1);
    }

    #[test]
    fn out_parameters_are_pointers() {
        let mut il = IlBinary::new();
        il.add_function(
            "f",
            BuiltinType::Void.id(),
            vec![Parameter::new(BuiltinType::Int.id(), [ParameterQualifier::Out])],
            &call_body(&[]),
        );
        let (words, _) = run(&il, TranspileOptions::default());
        let pointers = with(&words, Op::TypePointer);
        assert_eq!(pointers.len(), 1);
        assert_eq!(pointers[0][1], StorageClass::Function.value());
    }

    #[test]
    fn invalid_il_is_rejected() {
        let mut il = fragment(0, 0);
        il.functions[0].return_type = TypeId(77);
        let (words, messages) = run(&il, TranspileOptions::default());
        assert!(words.is_empty());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.starts_with("Invalid FIL binary"));
    }
}
