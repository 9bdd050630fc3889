pub mod vector_tile;

/// Field numbers of `vector_tile.proto` 2.1.
pub mod field {
    pub mod tile {
        pub const LAYERS: u32 = 3;
    }

    pub mod layer {
        pub const NAME: u32 = 1;
        pub const FEATURES: u32 = 2;
        pub const KEYS: u32 = 3;
        pub const VALUES: u32 = 4;
        pub const EXTENT: u32 = 5;
        pub const VERSION: u32 = 15;
    }

    pub mod feature {
        pub const ID: u32 = 1;
        pub const TAGS: u32 = 2;
        pub const TYPE: u32 = 3;
        pub const GEOMETRY: u32 = 4;
    }

    pub mod value {
        pub const STRING: u32 = 1;
        pub const FLOAT: u32 = 2;
        pub const DOUBLE: u32 = 3;
        pub const INT: u32 = 4;
        pub const UINT: u32 = 5;
        pub const SINT: u32 = 6;
        pub const BOOL: u32 = 7;
    }
}
