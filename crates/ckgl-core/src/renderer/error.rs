// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the hierarchy of error types for the rendering core.
//!
//! Every error in this crate is raised synchronously at the point of misuse. Nothing is
//! retried: the core is in-process bookkeeping, so there is no transient failure class.

use crate::renderer::api::enums::{GraphicsBackendType, ShaderStage};
use crate::renderer::api::handle::{BindTarget, ResourceHandle, ResourceKind};
use std::fmt;

/// A convenience alias for results produced by the rendering core.
pub type RenderResult<T> = Result<T, RenderError>;

/// An error related to shader programs and their uniforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A shader stage failed to compile.
    CompilationFailed {
        /// The stage that failed.
        stage: ShaderStage,
        /// The compiler's info log.
        log: String,
    },
    /// The program failed to link.
    LinkFailed {
        /// The linker's info log.
        log: String,
    },
    /// The program has no active uniform with this name.
    UniformNotFound {
        /// The uniform name that was looked up.
        name: String,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationFailed { stage, log } => {
                write!(f, "{stage:?} shader compile error: {log}")
            }
            ShaderError::LinkFailed { log } => write!(f, "Program link error: {log}"),
            ShaderError::UniformNotFound { name } => {
                write!(f, "Uniform '{name}' is not an active uniform of the program")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// Misuse of a GPU resource or of a binding slot. These are programmer errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A bind targeted a slot beyond the capacity discovered at initialization.
    SlotOutOfRange {
        /// The resource kind whose slot table was addressed.
        kind: ResourceKind,
        /// The requested slot index.
        slot: usize,
        /// The number of slots available for this kind.
        capacity: usize,
    },
    /// A handle was used after it was destroyed, or was never created through the cache.
    DestroyedHandle {
        /// The resource kind of the handle.
        kind: ResourceKind,
        /// The stale handle.
        handle: ResourceHandle,
    },
    /// A resource was requested with a zero or negative extent.
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The data supplied to fill a resource is smaller than the resource.
    InsufficientData {
        /// The number of bytes the resource needs.
        expected: usize,
        /// The number of bytes that were supplied.
        actual: usize,
    },
    /// A framebuffer was described with an attachment it cannot hold.
    InvalidAttachment(String),
    /// The backend reported the framebuffer as incomplete.
    IncompleteFramebuffer(String),
    /// A vertex layout or geometry input cannot be built as described.
    InvalidVertexLayout(String),
    /// A bind was requested with a target that does not belong to the resource kind.
    InvalidTarget {
        /// The resource kind being bound.
        kind: ResourceKind,
        /// The target that was supplied.
        target: BindTarget,
    },
    /// The backend could not create the object.
    CreationFailed {
        /// The kind of object being created.
        kind: ResourceKind,
        /// Backend-provided details.
        details: String,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::SlotOutOfRange {
                kind,
                slot,
                capacity,
            } => write!(
                f,
                "{kind:?} slot {slot} is out of range (capacity {capacity})"
            ),
            ResourceError::DestroyedHandle { kind, handle } => {
                write!(f, "{kind:?} handle {handle} has been destroyed or was never created")
            }
            ResourceError::InvalidDimensions { width, height } => {
                write!(f, "Invalid resource dimensions {width}x{height}")
            }
            ResourceError::InsufficientData { expected, actual } => write!(
                f,
                "Data array is not large enough: expected {expected} bytes, got {actual}"
            ),
            ResourceError::InvalidAttachment(msg) => write!(f, "Invalid attachment: {msg}"),
            ResourceError::IncompleteFramebuffer(status) => {
                write!(f, "Invalid framebuffer: {status}")
            }
            ResourceError::InvalidVertexLayout(msg) => write!(f, "Invalid vertex layout: {msg}"),
            ResourceError::InvalidTarget { kind, target } => {
                write!(f, "{kind:?} cannot be bound with target {target:?}")
            }
            ResourceError::CreationFailed { kind, details } => {
                write!(f, "Failed to create {kind:?}: {details}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// The top-level error of the rendering core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A raw value does not correspond to any variant of an engine enum.
    IllegalValue {
        /// The name of the engine type.
        type_name: &'static str,
        /// The offending raw value.
        value: u32,
    },
    /// The operation is not available on the active backend.
    Unsupported {
        /// A short description of the operation.
        operation: &'static str,
        /// The active backend.
        backend: GraphicsBackendType,
    },
    /// A resource or binding slot was misused.
    Resource(ResourceError),
    /// A shader program failed or was misused.
    Shader(ShaderError),
    /// The backend reported a failure that has no finer classification.
    Backend(String),
    /// A configuration value is invalid for the active backend.
    InvalidConfig(String),
}

impl RenderError {
    /// Shorthand for [`RenderError::Unsupported`].
    pub fn unsupported(operation: &'static str, backend: GraphicsBackendType) -> Self {
        RenderError::Unsupported { operation, backend }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::IllegalValue { type_name, value } => {
                write!(f, "Illegal value {value} for {type_name}")
            }
            RenderError::Unsupported { operation, backend } => {
                write!(f, "{operation} is not available on the {backend:?} backend")
            }
            RenderError::Resource(err) => write!(f, "Resource misuse: {err}"),
            RenderError::Shader(err) => write!(f, "Shader error: {err}"),
            RenderError::Backend(msg) => write!(f, "Backend error: {msg}"),
            RenderError::InvalidConfig(msg) => write!(f, "Invalid renderer configuration: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            RenderError::Shader(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

impl From<ShaderError> for RenderError {
    fn from(err: ShaderError) -> Self {
        RenderError::Shader(err)
    }
}
