use rivet_engine::coords::{Mat4, Vec2};
use rivet_engine::gfx::{
    GfxBackend, GfxCall, IndexSource, ProgramDesc, ProgramHandle, RecordingGfx, RenderState,
    Rgba8, Submission, Vertex, VertexSource, ViewId, ViewRect,
};
use rivet_rml::{
    AdapterError, Dimensions, GeometryHandle, RenderInterface, RmlAdapter, RmlConfig,
    TextureHandle,
};

const UI_VIEW: ViewId = ViewId(1);

fn programs(gfx: &mut RecordingGfx) -> (ProgramHandle, ProgramHandle) {
    let _ = env_logger::builder().is_test(true).try_init();

    let desc = |label, textured| ProgramDesc {
        label,
        wgsl: "",
        vertex_entry: "vs_main",
        fragment_entry: "fs_main",
        textured,
    };
    let color = gfx.create_program(&desc("color", false));
    let texture = gfx.create_program(&desc("texture", true));
    (color, texture)
}

fn adapter(gfx: &mut RecordingGfx) -> RmlAdapter<&mut RecordingGfx> {
    let (color, texture) = programs(gfx);
    RmlAdapter::new(gfx, RmlConfig::new(UI_VIEW, 1280, 720, color, texture))
}

fn quad() -> ([Vertex; 4], [u32; 6]) {
    let v = |x: f32, y: f32| Vertex::new([x, y], Rgba8::WHITE, [x / 10.0, y / 10.0]);
    (
        [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)],
        [0, 1, 2, 0, 2, 3],
    )
}

fn checker(w: u32, h: u32) -> Vec<u8> {
    (0..w * h)
        .flat_map(|i| if i % 2 == 0 { [255, 255, 255, 255] } else { [0, 0, 0, 255] })
        .collect()
}

fn submissions(ui: &RmlAdapter<&mut RecordingGfx>) -> Vec<Submission> {
    ui.backend().submissions().cloned().collect()
}

#[test]
fn texture_handles_are_monotonic_and_never_reissued() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let dims = Dimensions::new(2, 2);

    let a = ui.generate_texture(&checker(2, 2), dims).unwrap();
    let b = ui.generate_texture(&checker(2, 2), dims).unwrap();
    assert_eq!(a.raw(), 1);
    assert!(b > a);

    ui.release_texture(a);
    ui.release_texture(b);
    let c = ui.generate_texture(&checker(2, 2), dims).unwrap();
    assert!(c > b);
    assert_eq!(ui.texture_count(), 1);
}

#[test]
fn texture_and_geometry_counters_are_independent() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    let t = ui.generate_texture(&checker(1, 1), Dimensions::new(1, 1)).unwrap();
    let g = ui.compile_geometry(&verts, &idx, TextureHandle::NONE);
    assert_eq!(t.raw(), 1);
    assert_eq!(g.raw(), 1);
}

#[test]
fn double_release_is_a_noop() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    let t = ui.generate_texture(&checker(2, 2), Dimensions::new(2, 2)).unwrap();
    let g = ui.compile_geometry(&verts, &idx, t);
    ui.backend_mut().clear_calls();

    ui.release_compiled_geometry(g);
    ui.release_compiled_geometry(g);
    ui.release_texture(t);
    ui.release_texture(t);
    ui.release_texture(TextureHandle::from_raw(42));
    ui.release_compiled_geometry(GeometryHandle::NONE);

    let calls = ui.backend().calls().to_vec();
    assert_eq!(
        calls.iter().filter(|c| matches!(c, GfxCall::DestroyTexture(_))).count(),
        1
    );
    assert_eq!(
        calls.iter().filter(|c| matches!(c, GfxCall::DestroyVertexBuffer(_))).count(),
        1
    );
    assert_eq!(ui.texture_count(), 0);
    assert_eq!(ui.geometry_count(), 0);
}

#[test]
fn compiled_geometry_draws_repeatedly_without_reupload() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    let g = ui.compile_geometry(&verts, &idx, TextureHandle::NONE);
    ui.backend_mut().clear_calls();

    for i in 0..3 {
        ui.render_compiled_geometry(g, Vec2::new(i as f32, 0.0));
    }

    let calls = ui.backend().calls().to_vec();
    assert!(!calls.iter().any(|c| matches!(
        c,
        GfxCall::CreateVertexBuffer { .. }
            | GfxCall::CreateIndexBuffer { .. }
            | GfxCall::UpdateDynamicVertexBuffer { .. }
    )));

    let subs = submissions(&ui);
    assert_eq!(subs.len(), 3);
    let first = subs[0].vertices;
    assert!(matches!(first, Some(VertexSource::Static(_))));
    assert!(subs.iter().all(|s| s.vertices == first));
    assert!(matches!(subs[0].indices, Some(IndexSource::Static(_))));
    assert_eq!(subs[2].transform.translation_part(), Vec2::new(2.0, 0.0));
}

#[test]
fn immediate_draws_flush_in_enqueue_order() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    for i in 0..4 {
        ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::new(i as f32 * 10.0, 1.0));
    }
    assert_eq!(ui.queued_len(), 4);
    assert!(submissions(&ui).is_empty());

    ui.flush_frame();
    assert_eq!(ui.queued_len(), 0);

    let subs = submissions(&ui);
    assert_eq!(subs.len(), 4);
    for (i, s) in subs.iter().enumerate() {
        assert_eq!(s.view, UI_VIEW);
        assert_eq!(s.state, RenderState::UI);
        assert_eq!(s.transform.translation_part(), Vec2::new(i as f32 * 10.0, 1.0));
        assert!(matches!(s.vertices, Some(VertexSource::Dynamic(_))));
        assert!(matches!(s.indices, Some(IndexSource::Dynamic(_))));
    }
}

#[test]
fn each_flushed_draw_uploads_its_own_data() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (mut verts, idx) = quad();

    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    verts[0].color = Rgba8::BLACK;
    ui.render_geometry(&verts, &idx[..3], TextureHandle::NONE, Vec2::ZERO);
    ui.backend_mut().clear_calls();
    ui.flush_frame();

    let uploads: Vec<Vec<Vertex>> = ui
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match c {
            GfxCall::UpdateDynamicVertexBuffer { vertices, .. } => Some(vertices.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0][0].color, Rgba8::WHITE);
    assert_eq!(uploads[1][0].color, Rgba8::BLACK);

    let index_uploads: Vec<usize> = ui
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match c {
            GfxCall::UpdateDynamicIndexBuffer { indices, .. } => Some(indices.len()),
            _ => None,
        })
        .collect();
    assert_eq!(index_uploads, vec![6, 3]);
}

#[test]
fn empty_flush_makes_no_backend_calls() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    ui.backend_mut().clear_calls();

    ui.flush_frame();
    ui.render_geometry(&[], &[0, 1, 2], TextureHandle::NONE, Vec2::ZERO);
    ui.flush_frame();

    assert!(ui.backend().calls().is_empty());
}

#[test]
fn geometry_without_indices_draws_vertex_list() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, _) = quad();

    ui.render_geometry(&verts[..3], &[], TextureHandle::NONE, Vec2::ZERO);
    ui.flush_frame();
    let g = ui.compile_geometry(&verts[..3], &[], TextureHandle::NONE);
    ui.render_compiled_geometry(g, Vec2::ZERO);

    let subs = submissions(&ui);
    assert_eq!(subs.len(), 2);
    assert!(subs.iter().all(|s| s.indices.is_none()));
    assert!(
        !ui.backend()
            .calls()
            .iter()
            .any(|c| matches!(c, GfxCall::CreateIndexBuffer { .. } | GfxCall::UpdateDynamicIndexBuffer { .. }))
    );
}

#[test]
fn scissor_protocol_folds_into_single_view_calls() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    ui.backend_mut().clear_calls();

    ui.set_scissor_region(10, 10, 50, 50);
    assert_eq!(ui.backend().scissor_calls().count(), 0);

    ui.enable_scissor_region(true);
    ui.enable_scissor_region(false);
    ui.enable_scissor_region(true);

    let scissors: Vec<_> = ui.backend().scissor_calls().collect();
    assert_eq!(
        scissors,
        vec![
            (UI_VIEW, ViewRect::new(10, 10, 50, 50)),
            (UI_VIEW, ViewRect::NONE),
            (UI_VIEW, ViewRect::new(10, 10, 50, 50)),
        ]
    );

    ui.set_scissor_region(-4, 0, 20, 20);
    assert_eq!(
        ui.backend().scissor_calls().last(),
        Some((UI_VIEW, ViewRect::new(0, 0, 20, 20)))
    );
}

#[test]
fn enabling_scissor_without_region_disables_clipping() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    ui.enable_scissor_region(true);
    assert_eq!(ui.backend().scissor_calls().last(), Some((UI_VIEW, ViewRect::NONE)));
}

/// Scissor rect most recently set before each submit, in submit order.
fn scissor_per_submit(calls: &[GfxCall]) -> Vec<ViewRect> {
    let mut current = ViewRect::NONE;
    let mut out = Vec::new();
    for call in calls {
        match call {
            GfxCall::SetViewScissor { rect, .. } => current = *rect,
            GfxCall::Submit(_) => out.push(current),
            _ => {}
        }
    }
    out
}

#[test]
fn immediate_draw_keeps_scissor_from_when_it_was_recorded() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    ui.set_scissor_region(10, 10, 20, 20);
    ui.enable_scissor_region(true);
    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    ui.enable_scissor_region(false);
    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    ui.flush_frame();

    assert_eq!(
        scissor_per_submit(ui.backend().calls()),
        vec![ViewRect::new(10, 10, 20, 20), ViewRect::NONE]
    );
    assert_eq!(ui.backend().scissor_calls().last(), Some((UI_VIEW, ViewRect::NONE)));
}

#[test]
fn flush_restores_live_scissor_after_clipped_draws() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    ui.set_scissor_region(0, 0, 8, 8);
    ui.enable_scissor_region(true);
    ui.backend_mut().clear_calls();
    ui.flush_frame();

    assert_eq!(scissor_per_submit(ui.backend().calls()), vec![ViewRect::NONE]);
    assert_eq!(
        ui.backend().scissor_calls().collect::<Vec<_>>(),
        vec![(UI_VIEW, ViewRect::NONE), (UI_VIEW, ViewRect::new(0, 0, 8, 8))]
    );
}

#[test]
fn flush_under_unchanged_scissor_sets_no_scissor() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    ui.set_scissor_region(5, 5, 40, 40);
    ui.enable_scissor_region(true);
    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    ui.backend_mut().clear_calls();
    ui.flush_frame();

    assert_eq!(ui.backend().scissor_calls().count(), 0);
    assert_eq!(submissions(&ui).len(), 2);
}

#[test]
fn textured_immediate_draws_bind_the_shared_sampler() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();
    let (color, texture_program) = (ui.color_program(), ui.texture_program());

    let samplers: Vec<_> = ui
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match c {
            GfxCall::CreateSamplerUniform { handle, .. } => Some(*handle),
            _ => None,
        })
        .collect();
    assert_eq!(samplers.len(), 1);
    let sampler = samplers[0];

    let t = ui.generate_texture(&checker(2, 2), Dimensions::new(2, 2)).unwrap();
    let backend_texture = ui
        .backend()
        .calls()
        .iter()
        .find_map(|c| match c {
            GfxCall::CreateTexture { handle, .. } => Some(*handle),
            _ => None,
        })
        .unwrap();

    ui.render_geometry(&verts, &idx, t, Vec2::ZERO);
    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    ui.render_geometry(&verts, &idx, t, Vec2::new(3.0, 0.0));
    ui.backend_mut().clear_calls();
    ui.flush_frame();

    let subs = submissions(&ui);
    let programs: Vec<_> = subs.iter().map(|s| s.program).collect();
    assert_eq!(programs, vec![texture_program, color, texture_program]);
    assert_eq!(subs[0].texture, Some((0, sampler, backend_texture)));
    assert_eq!(subs[1].texture, None);
    assert_eq!(subs[2].texture, Some((0, sampler, backend_texture)));

    assert!(
        !ui.backend()
            .calls()
            .iter()
            .any(|c| matches!(c, GfxCall::CreateSamplerUniform { .. }))
    );
}

#[test]
fn missing_image_fails_without_allocating() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);

    let err = ui
        .load_texture(std::path::Path::new("missing.png"))
        .unwrap_err();
    assert!(matches!(err, AdapterError::ImageLoad { .. }));
    assert_eq!(ui.texture_count(), 0);
    assert_eq!(ui.backend().live_textures(), 0);

    let t = ui.generate_texture(&checker(1, 1), Dimensions::new(1, 1)).unwrap();
    assert_eq!(t.raw(), 1);
}

#[test]
fn corrupt_image_is_a_load_error() {
    let path = std::env::temp_dir().join(format!("rivet-rml-corrupt-{}.png", std::process::id()));
    std::fs::write(&path, b"definitely not a png").unwrap();

    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let result = ui.load_texture(&path);
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(AdapterError::ImageLoad { .. })));
    assert_eq!(ui.texture_count(), 0);
}

#[test]
fn png_loads_as_rgba_texture() {
    let path = std::env::temp_dir().join(format!("rivet-rml-load-{}.png", std::process::id()));
    image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
        .save(&path)
        .unwrap();

    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let result = ui.load_texture(&path);
    let _ = std::fs::remove_file(&path);

    let (handle, dims) = result.unwrap();
    assert_eq!(dims, Dimensions::new(3, 2));
    assert_eq!(ui.texture_dimensions(handle), Some(dims));
    assert!(ui.backend().calls().iter().any(|c| matches!(
        c,
        GfxCall::CreateTexture { desc, len: 24, .. } if desc.width == 3 && desc.height == 2
    )));
}

#[test]
fn malformed_pixel_data_is_rejected() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);

    let short = ui.generate_texture(&[0; 7], Dimensions::new(2, 1));
    assert!(matches!(short, Err(AdapterError::InvalidTextureData { len: 7, .. })));

    let empty = ui.generate_texture(&[], Dimensions::new(0, 4));
    assert!(matches!(empty, Err(AdapterError::InvalidTextureData { .. })));

    assert_eq!(ui.texture_count(), 0);
    assert_eq!(ui.backend().live_textures(), 0);
}

#[test]
fn textured_quad_end_to_end() {
    let mut gfx = RecordingGfx::new();
    let (color, texture_program) = programs(&mut gfx);
    let mut ui = RmlAdapter::new(&mut gfx, RmlConfig::new(UI_VIEW, 800, 600, color, texture_program));
    let (verts, idx) = quad();

    let t = ui.generate_texture(&checker(4, 4), Dimensions::new(4, 4)).unwrap();
    let g = ui.compile_geometry(&verts, &idx, t);
    ui.render_compiled_geometry(g, Vec2::new(5.0, 5.0));
    ui.release_compiled_geometry(g);

    assert_eq!(ui.geometry_count(), 0);
    let subs = submissions(&ui);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].program, texture_program);
    assert!(subs[0].texture.is_some());
    assert_eq!(subs[0].transform, Mat4::translation(5.0, 5.0, 0.0));
    assert_eq!(subs[0].state, RenderState::UI);
}

#[test]
fn unknown_texture_draws_untextured() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();
    let color = ui.color_program();

    ui.render_geometry(&verts, &idx, TextureHandle::from_raw(77), Vec2::ZERO);
    ui.flush_frame();
    let g = ui.compile_geometry(&verts, &idx, TextureHandle::from_raw(77));
    ui.render_compiled_geometry(g, Vec2::ZERO);

    let subs = submissions(&ui);
    assert_eq!(subs.len(), 2);
    assert!(subs.iter().all(|s| s.program == color && s.texture.is_none()));
}

#[test]
fn released_texture_is_not_drawn_by_compiled_geometry() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    let t = ui.generate_texture(&checker(2, 2), Dimensions::new(2, 2)).unwrap();
    let g = ui.compile_geometry(&verts, &idx, t);
    ui.release_texture(t);
    ui.render_compiled_geometry(g, Vec2::ZERO);

    let subs = submissions(&ui);
    assert_eq!(subs[0].program, ui.color_program());
    assert!(subs[0].texture.is_none());
}

#[test]
fn unknown_compiled_geometry_is_not_drawn() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    ui.render_compiled_geometry(GeometryHandle::from_raw(9), Vec2::ZERO);
    assert!(submissions(&ui).is_empty());
}

#[test]
fn view_is_configured_and_follows_resize() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);

    let rects: Vec<_> = ui
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match c {
            GfxCall::SetViewRect { view, rect } => Some((*view, *rect)),
            _ => None,
        })
        .collect();
    assert_eq!(rects, vec![(UI_VIEW, ViewRect::new(0, 0, 1280, 720))]);

    ui.backend_mut().clear_calls();
    ui.resize(640, 480);
    let calls = ui.backend().calls().to_vec();
    assert!(calls.contains(&GfxCall::SetViewRect {
        view: UI_VIEW,
        rect: ViewRect::new(0, 0, 640, 480),
    }));
    assert!(calls.contains(&GfxCall::SetViewTransform {
        view: UI_VIEW,
        view_mtx: Mat4::IDENTITY,
        proj: Mat4::ortho(0.0, 640.0, 480.0, 0.0, -1.0, 1.0),
    }));

    ui.backend_mut().clear_calls();
    ui.set_view_parameters(Some(ViewId(3)));
    assert!(ui.backend().calls().iter().all(|c| match c {
        GfxCall::SetViewRect { view, .. } | GfxCall::SetViewTransform { view, .. } => *view == ViewId(3),
        _ => true,
    }));
    assert_eq!(ui.backend().calls().len(), 2);
}

#[test]
fn unmanaged_view_is_left_alone() {
    let mut gfx = RecordingGfx::new();
    let (color, texture) = programs(&mut gfx);
    let mut config = RmlConfig::new(UI_VIEW, 100, 100, color, texture);
    config.configure_view = false;

    let mut ui = RmlAdapter::new(&mut gfx, config);
    ui.resize(200, 200);
    assert!(!ui.backend().calls().iter().any(|c| matches!(
        c,
        GfxCall::SetViewRect { .. } | GfxCall::SetViewTransform { .. }
    )));
}

#[test]
fn program_and_view_setters_take_effect() {
    let mut gfx = RecordingGfx::new();
    let mut ui = adapter(&mut gfx);
    let (verts, idx) = quad();

    let other = ui.texture_program();
    ui.set_color_program(other);
    ui.set_view(ViewId(4));
    ui.render_geometry(&verts, &idx, TextureHandle::NONE, Vec2::ZERO);
    ui.flush_frame();

    let subs = submissions(&ui);
    assert_eq!(subs[0].program, other);
    assert_eq!(subs[0].view, ViewId(4));
    assert_eq!(ui.view(), ViewId(4));
}

#[test]
fn drop_destroys_every_outstanding_resource() {
    let mut gfx = RecordingGfx::new();
    {
        let mut ui = adapter(&mut gfx);
        let (verts, idx) = quad();
        let t = ui.generate_texture(&checker(2, 2), Dimensions::new(2, 2)).unwrap();
        ui.generate_texture(&checker(1, 1), Dimensions::new(1, 1)).unwrap();
        ui.compile_geometry(&verts, &idx, t);
        ui.compile_geometry(&verts, &[], TextureHandle::NONE);
        ui.render_geometry(&verts, &idx, t, Vec2::ZERO);
    }

    assert_eq!(gfx.live_vertex_buffers(), 0);
    assert_eq!(gfx.live_index_buffers(), 0);
    assert_eq!(gfx.live_textures(), 0);
    assert_eq!(gfx.live_dynamic_buffers(), 0);
    assert_eq!(gfx.live_uniforms(), 0);
    // Programs belong to the caller.
    assert_eq!(gfx.live_programs(), 2);

    // Geometry goes before textures.
    let calls = gfx.calls();
    let last_vb = calls
        .iter()
        .rposition(|c| matches!(c, GfxCall::DestroyVertexBuffer(_)))
        .unwrap();
    let first_tex = calls
        .iter()
        .position(|c| matches!(c, GfxCall::DestroyTexture(_)))
        .unwrap();
    assert!(last_vb < first_tex);
}

#[test]
fn drop_with_nothing_allocated_releases_only_shared_resources() {
    let mut gfx = RecordingGfx::new();
    drop(adapter(&mut gfx));
    assert_eq!(gfx.live_dynamic_buffers(), 0);
    assert_eq!(gfx.live_uniforms(), 0);
}
