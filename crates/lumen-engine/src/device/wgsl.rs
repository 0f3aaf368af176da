//! WGSL front-end checks run before handing shader source to wgpu.
//!
//! wgpu reports invalid shaders through its uncaptured-error handler, which is
//! too late for a compile step that must return the compiler log. Parsing and
//! validating with naga first, against the capabilities the device actually
//! has, gives the same diagnostics synchronously.

use std::collections::{BTreeMap, BTreeSet};

use naga::valid::Capabilities;

use super::ShaderStage;

/// Location-bound inputs and outputs of a stage's entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StageInterface {
    pub inputs: BTreeSet<u32>,
    pub outputs: BTreeSet<u32>,
    /// Input locations whose type is not `f32` or a vector of `f32`.
    pub non_float_inputs: BTreeSet<u32>,
    /// Component count of each `f32`-based input.
    pub float_input_components: BTreeMap<u32, u32>,
}

/// Shader capabilities granted by `features`, the subset of wgpu's own mapping
/// that WGSL source can reach.
pub(crate) fn capabilities(features: wgpu::Features) -> Capabilities {
    let pairs = [
        (Capabilities::IMMEDIATES, wgpu::Features::IMMEDIATES),
        (Capabilities::FLOAT64, wgpu::Features::SHADER_F64),
        (Capabilities::SHADER_FLOAT16, wgpu::Features::SHADER_F16),
        (Capabilities::SHADER_INT64, wgpu::Features::SHADER_INT64),
        (Capabilities::PRIMITIVE_INDEX, wgpu::Features::SHADER_PRIMITIVE_INDEX),
        (Capabilities::MULTIVIEW, wgpu::Features::MULTIVIEW),
        (Capabilities::EARLY_DEPTH_TEST, wgpu::Features::SHADER_EARLY_DEPTH_TEST),
        (Capabilities::DUAL_SOURCE_BLENDING, wgpu::Features::DUAL_SOURCE_BLENDING),
        (Capabilities::CLIP_DISTANCE, wgpu::Features::CLIP_DISTANCES),
    ];

    let mut caps = Capabilities::empty();
    for (cap, feature) in pairs {
        caps.set(cap, features.contains(feature));
    }
    caps
}

/// Parses and validates `source` and extracts the single entry point for `stage`.
///
/// Returns the human-readable compiler log on failure.
pub(crate) fn check_stage(
    stage: ShaderStage,
    source: &str,
    caps: Capabilities,
) -> Result<StageInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(naga::valid::ValidationFlags::all(), caps);
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    let mut entry_points = module.entry_points.iter().filter(|ep| ep.stage == wanted);
    let Some(ep) = entry_points.next() else {
        return Err(format!("no @{stage} entry point in module"));
    };
    if entry_points.next().is_some() {
        return Err(format!("more than one @{stage} entry point in module"));
    }

    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        collect_locations(&module, arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    let mut outputs = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_locations(&module, result.ty, result.binding.as_ref(), &mut outputs);
    }

    Ok(StageInterface {
        inputs: inputs.iter().map(|&(l, _)| l).collect(),
        outputs: outputs.iter().map(|&(l, _)| l).collect(),
        non_float_inputs: inputs
            .iter()
            .filter(|&&(_, ty)| f32_components(&module.types[ty].inner).is_none())
            .map(|&(l, _)| l)
            .collect(),
        float_input_components: inputs
            .iter()
            .filter_map(|&(l, ty)| f32_components(&module.types[ty].inner).map(|n| (l, n)))
            .collect(),
    })
}

/// Checks that the stages fit together and fit the float-only vertex attributes.
pub(crate) fn check_link(vertex: &StageInterface, fragment: &StageInterface) -> Result<(), String> {
    let mut problems = Vec::new();

    let missing: Vec<String> = fragment
        .inputs
        .difference(&vertex.outputs)
        .map(|l| l.to_string())
        .collect();
    if !missing.is_empty() {
        problems.push(format!(
            "fragment input location(s) {} are not written by the vertex stage",
            missing.join(", ")
        ));
    }

    let non_float: Vec<String> = vertex.non_float_inputs.iter().map(|l| l.to_string()).collect();
    if !non_float.is_empty() {
        problems.push(format!(
            "vertex input location(s) {} must be f32 or vecN<f32>; vertex attributes are float",
            non_float.join(", ")
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("\n"))
    }
}

fn f32_components(inner: &naga::TypeInner) -> Option<u32> {
    match *inner {
        naga::TypeInner::Scalar(naga::Scalar::F32) => Some(1),
        naga::TypeInner::Vector { size, scalar: naga::Scalar::F32 } => Some(size as u32),
        _ => None,
    }
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<(u32, naga::Handle<naga::Type>)>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push((*location, ty)),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}
