//! Apply-engine behavior: idempotence, coalescing, ordering.

mod common;

use common::{device, flushed_device};
use pretty_assertions::assert_eq;
use slate_gpu::recording::ContextCall;
use slate_gpu::{
    Cull, FillMode, PrimitiveType, ShaderName, Texture, TextureId, UniformName,
};

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

#[test]
fn clean_draw_issues_only_the_draw() {
    let mut device = flushed_device();
    device.draw(PrimitiveType::TriangleList, 0, 2);
    assert_eq!(
        device.context().calls,
        vec![ContextCall::Draw {
            primitive: PrimitiveType::TriangleList,
            start_vertex: 0,
            vertex_count: 6,
        }]
    );
}

#[test]
fn noop_setters_do_not_touch_the_context() {
    let mut device = flushed_device();
    // All of these match the state already in effect.
    device.set_cull_mode(Cull::None);
    device.set_fill_mode(FillMode::Solid);
    device.set_z_enable(false);
    device.set_alpha_blend_enable(false);
    device.set_shader(ShaderName::Screen2d);
    device.draw(PrimitiveType::TriangleList, 0, 1);
    assert_eq!(
        device.context().calls,
        vec![ContextCall::Draw {
            primitive: PrimitiveType::TriangleList,
            start_vertex: 0,
            vertex_count: 3,
        }]
    );
}

#[test]
fn repeated_changes_coalesce_into_one_transition() {
    let mut device = flushed_device();
    device.set_cull_mode(Cull::Clockwise);
    device.set_cull_mode(Cull::None);
    device.set_cull_mode(Cull::Clockwise);
    device.set_fill_mode(FillMode::Wireframe);
    device.draw(PrimitiveType::TriangleList, 0, 1);

    let raster_calls: Vec<_> = device
        .context()
        .calls
        .iter()
        .filter_map(|c| match c {
            ContextCall::SetRasterizerState(state) => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(raster_calls.len(), 1);
    assert_eq!(raster_calls[0].cull, Cull::Clockwise);
    assert_eq!(raster_calls[0].fill, FillMode::Wireframe);
}

#[test]
fn round_trip_back_to_applied_state_is_elided() {
    let mut device = flushed_device();
    device.set_cull_mode(Cull::Clockwise);
    device.set_cull_mode(Cull::None);
    device.draw(PrimitiveType::TriangleList, 0, 1);
    assert_eq!(
        device
            .context()
            .count(|c| matches!(c, ContextCall::SetRasterizerState(_))),
        0
    );
}

#[test]
fn apply_order_is_shader_then_uniforms_then_textures() {
    let mut device = flushed_device();
    device.set_shader(ShaderName::World3d);
    device.set_uniform(UniformName::Projection, &IDENTITY);
    device.set_texture(Some(&Texture::new(TextureId(9))));
    device.draw(PrimitiveType::TriangleList, 0, 1);

    let ctx = device.context();
    let program = ctx
        .position(|c| matches!(c, ContextCall::BindProgram(_)))
        .expect("program bind");
    let uniform = ctx
        .position(|c| matches!(c, ContextCall::SetUniform { .. }))
        .expect("uniform transfer");
    let texture = ctx
        .position(|c| matches!(c, ContextCall::BindTexture { .. }))
        .expect("texture bind");
    let draw = ctx
        .position(|c| matches!(c, ContextCall::Draw { .. }))
        .expect("draw");
    assert!(program < uniform);
    assert!(uniform < texture);
    assert!(texture < draw);
}

#[test]
fn per_group_apply_leaves_nothing_for_the_next_draw() {
    let mut device = flushed_device();
    device.set_cull_mode(Cull::Clockwise);
    device.apply_rasterizer_state();
    assert_eq!(
        device
            .context()
            .count(|c| matches!(c, ContextCall::SetRasterizerState(_))),
        1
    );
    device.context_mut().clear_calls();
    device.draw(PrimitiveType::TriangleList, 0, 1);
    assert_eq!(
        device
            .context()
            .count(|c| matches!(c, ContextCall::SetRasterizerState(_))),
        0
    );
}

/// The end-to-end scenario from the performance contract: cull mode, shader
/// and one matrix set on a fresh device; the draw issues one program bind,
/// one matrix transfer and one rasterizer transition, in that order, and no
/// texture or buffer calls at all.
#[test]
fn fresh_device_scenario() {
    let mut device = device();
    device.context_mut().clear_calls();

    device.set_cull_mode(Cull::Clockwise);
    device.set_shader(ShaderName::World3d);
    device.set_uniform(UniformName::Projection, &IDENTITY);
    device.draw(PrimitiveType::TriangleList, 0, 2);

    let ctx = device.context();
    assert_eq!(ctx.count(|c| matches!(c, ContextCall::BindProgram(_))), 1);
    let uniforms: Vec<_> = ctx
        .calls
        .iter()
        .filter_map(|c| match c {
            ContextCall::SetUniform { values, .. } => Some(values.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(uniforms.len(), 1);
    assert_eq!(uniforms[0].len(), 16);
    assert_eq!(
        ctx.count(|c| matches!(c, ContextCall::SetRasterizerState(_))),
        1
    );
    assert_eq!(
        ctx.count(|c| {
            matches!(
                c,
                ContextCall::BindTexture { .. }
                    | ContextCall::BindSampler { .. }
                    | ContextCall::BindVertexBuffer(_)
                    | ContextCall::BindIndexBuffer(_)
            )
        }),
        0
    );

    let program = ctx
        .position(|c| matches!(c, ContextCall::BindProgram(_)))
        .unwrap();
    let uniform = ctx
        .position(|c| matches!(c, ContextCall::SetUniform { .. }))
        .unwrap();
    let raster = ctx
        .position(|c| matches!(c, ContextCall::SetRasterizerState(_)))
        .unwrap();
    assert!(program < uniform);
    assert!(uniform < raster);
}
