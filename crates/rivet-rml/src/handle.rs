//! Library-facing resource handles.
//!
//! Values start at 1, increase monotonically per kind and are never reissued.
//! `0` is [`TextureHandle::NONE`] / [`GeometryHandle::NONE`].

macro_rules! ui_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const NONE: $name = $name(0);

            #[inline]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u64 {
                self.0
            }

            #[inline]
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }
        }
    };
}

ui_handle!(
    /// Texture created by `generate_texture` or `load_texture`.
    TextureHandle
);
ui_handle!(
    /// Geometry uploaded by `compile_geometry`.
    GeometryHandle
);
