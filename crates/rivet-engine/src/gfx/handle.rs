//! Backend resource handles.
//!
//! Handles are plain indices into backend-owned tables. They are `Copy` and
//! carry no lifetime; using a handle after destroying it is a client bug that
//! backends report through logging rather than panicking.

macro_rules! gfx_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a backend table index.
            #[inline]
            pub const fn from_raw(index: u32) -> Self {
                Self(index)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

gfx_handle!(
    /// Immutable vertex buffer.
    VertexBufferHandle
);
gfx_handle!(
    /// Immutable 32-bit index buffer.
    IndexBufferHandle
);
gfx_handle!(
    /// Vertex buffer whose contents are replaced with `update_*` calls.
    DynamicVertexBufferHandle
);
gfx_handle!(
    /// 32-bit index buffer whose contents are replaced with `update_*` calls.
    DynamicIndexBufferHandle
);
gfx_handle!(TextureHandle);
gfx_handle!(
    /// Named sampler slot textures are bound through.
    UniformHandle
);
gfx_handle!(ProgramHandle);
