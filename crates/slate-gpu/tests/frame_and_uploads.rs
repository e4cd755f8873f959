//! Frame bracketing, viewport, uploads, texture maintenance.

mod common;

use common::flushed_device;
use pretty_assertions::assert_eq;
use slate_gpu::recording::ContextCall;
use slate_gpu::{
    ClearMask, CubeMapFace, IndexBuffer, BufferId, PrimitiveType, RenderTarget, Texture,
    TextureId, VertexBuffer, VertexFormat,
};

#[test]
fn start_rendering_clears_and_applies_viewport() {
    let mut device = flushed_device();
    device.set_viewport(640, 480);
    device.start_rendering(true, 0xff2040c0, None, true);

    let ctx = device.context();
    let begin = ctx
        .position(|c| matches!(c, ContextCall::BeginFrame { .. }))
        .expect("begin frame");
    let viewport = ctx
        .position(|c| matches!(c, ContextCall::SetViewport { .. }))
        .expect("viewport");
    assert!(begin < viewport);

    match &ctx.calls[begin] {
        ContextCall::BeginFrame {
            target,
            clear,
            use_depth,
            ..
        } => {
            assert_eq!(*target, RenderTarget::Default);
            assert_eq!(*clear, ClearMask::COLOR | ClearMask::DEPTH | ClearMask::STENCIL);
            assert!(*use_depth);
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(
        ctx.count(|c| matches!(c, ContextCall::SetViewport { width: 640, height: 480 })),
        1
    );
}

#[test]
fn offscreen_target_and_no_clear() {
    let mut device = flushed_device();
    let target = Texture::new(TextureId(11));
    device.start_rendering(false, 0, Some(&target), false);
    assert_eq!(
        device.context().count(|c| matches!(
            c,
            ContextCall::BeginFrame {
                target: RenderTarget::Texture(TextureId(11)),
                clear,
                ..
            } if clear.is_empty()
        )),
        1
    );
}

#[test]
fn unchanged_viewport_is_not_resent() {
    let mut device = flushed_device();
    device.set_viewport(640, 480);
    device.start_rendering(false, 0, None, false);
    device.context_mut().clear_calls();

    device.set_viewport(640, 480);
    device.start_rendering(false, 0, None, false);
    assert_eq!(
        device
            .context()
            .count(|c| matches!(c, ContextCall::SetViewport { .. })),
        0
    );
}

#[test]
fn present_on_clean_state_only_swaps() {
    let mut device = flushed_device();
    device.present();
    assert_eq!(device.context().calls, vec![ContextCall::SwapBuffers]);
}

#[test]
fn context_is_made_current_again_after_finish() {
    let mut device = flushed_device();
    device.finish_rendering();
    device.context_mut().clear_calls();
    device.draw(PrimitiveType::TriangleList, 0, 1);
    assert_eq!(
        device.context().calls,
        vec![
            ContextCall::MakeCurrent,
            ContextCall::Draw {
                primitive: PrimitiveType::TriangleList,
                start_vertex: 0,
                vertex_count: 3,
            }
        ]
    );
}

#[test]
fn buffer_uploads_pass_through() {
    let mut device = flushed_device();
    let mut vb = VertexBuffer::new(BufferId(5), VertexFormat::Flat);
    let ib = IndexBuffer::new(BufferId(6));

    device.set_vertex_buffer_data(&mut vb, &[0u8; 48], VertexFormat::World);
    assert_eq!(vb.format, VertexFormat::World);
    device.set_vertex_buffer_subdata(&vb, 16, &[0u8; 8]);
    device.set_index_buffer_data(&ib, &[0u8; 12]);

    let ctx = device.context();
    assert_eq!(
        ctx.count(|c| matches!(
            c,
            ContextCall::VertexBufferData {
                buffer: BufferId(5),
                len: 48
            }
        )),
        1
    );
    assert_eq!(
        ctx.count(|c| matches!(
            c,
            ContextCall::VertexBufferSubdata {
                buffer: BufferId(5),
                offset: 16,
                len: 8
            }
        )),
        1
    );
    assert_eq!(
        ctx.count(|c| matches!(
            c,
            ContextCall::IndexBufferData {
                buffer: BufferId(6),
                len: 12
            }
        )),
        1
    );
}

#[test]
fn format_change_on_the_selected_buffer_rebinds_it() {
    let mut device = flushed_device();
    let mut vb = VertexBuffer::new(BufferId(5), VertexFormat::Flat);
    device.set_vertex_buffer(Some(&vb));
    device.draw(PrimitiveType::TriangleList, 0, 1);
    device.context_mut().clear_calls();

    device.set_vertex_buffer_data(&mut vb, &[0u8; 36], VertexFormat::World);
    device.draw(PrimitiveType::TriangleList, 0, 1);
    assert_eq!(
        device.context().count(|c| matches!(
            c,
            ContextCall::BindVertexBuffer(Some(b)) if b.format == VertexFormat::World
        )),
        1
    );
}

#[test]
fn mapped_pixel_transfer_round_trips() {
    let mut device = flushed_device();
    let texture = Texture::new(TextureId(3));
    device
        .context_mut()
        .pixel_buffers
        .insert(TextureId(3), vec![0u8; 16]);

    device.with_mapped_pixels(&texture, |pixels| pixels.fill(0xab));

    let ctx = device.context();
    assert_eq!(
        ctx.count(|c| matches!(c, ContextCall::MapPixelBuffer(TextureId(3)))),
        1
    );
    assert_eq!(
        ctx.count(|c| matches!(c, ContextCall::UnmapPixelBuffer(TextureId(3)))),
        1
    );
    assert_eq!(ctx.pixel_buffers[&TextureId(3)], vec![0xab; 16]);
}

#[test]
fn failed_map_is_recorded_and_skips_the_callback() {
    let mut device = flushed_device();
    let texture = Texture::new(TextureId(3));
    device.context_mut().fail_pixel_map = true;

    let mut called = false;
    device.with_mapped_pixels(&texture, |_| called = true);
    assert!(!called);
    assert!(device.get_error().contains("map_pixel_buffer"));
    assert_eq!(
        device
            .context()
            .count(|c| matches!(c, ContextCall::UnmapPixelBuffer(_))),
        0
    );
}

#[test]
fn texture_maintenance_and_invalidation() {
    let mut device = flushed_device();
    let texture = Texture::new(TextureId(7));

    device.set_texture(Some(&texture));
    device.draw(PrimitiveType::TriangleList, 0, 1);
    device.context_mut().clear_calls();

    // Pixels replaced behind the handle: same identity, forced rebind.
    device.set_pixels(&texture, &[0u8; 64]);
    device.invalidate_texture(&texture);
    device.draw(PrimitiveType::TriangleList, 0, 1);

    let ctx = device.context();
    assert_eq!(
        ctx.count(|c| matches!(c, ContextCall::TexturePixels { texture: TextureId(7), len: 64 })),
        1
    );
    assert_eq!(
        ctx.count(|c| matches!(c, ContextCall::BindTexture { texture: Some(TextureId(7)), .. })),
        1
    );
    // The sampler pair is a cache hit.
    assert_eq!(ctx.count(|c| matches!(c, ContextCall::CreateSampler(_))), 0);
}

#[test]
fn cube_face_upload_and_copy() {
    let mut device = flushed_device();
    let texture = Texture::new(TextureId(9));
    device.set_cube_pixels(&texture, CubeMapFace::NegativeY, &[0u8; 32]);
    device.copy_texture(&texture, CubeMapFace::PositiveZ);

    let ctx = device.context();
    assert_eq!(
        ctx.count(|c| matches!(
            c,
            ContextCall::CubeTexturePixels {
                texture: TextureId(9),
                face: CubeMapFace::NegativeY,
                len: 32
            }
        )),
        1
    );
    assert_eq!(
        ctx.count(|c| matches!(
            c,
            ContextCall::CopyToCubeFace {
                dst: TextureId(9),
                face: CubeMapFace::PositiveZ
            }
        )),
        1
    );
}
