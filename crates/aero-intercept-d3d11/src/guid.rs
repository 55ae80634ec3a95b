use std::fmt;

/// COM-style interface identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const fn from_u128(v: u128) -> Self {
        Self {
            data1: (v >> 96) as u32,
            data2: (v >> 80) as u16,
            data3: (v >> 64) as u16,
            data4: (v as u64).to_be_bytes(),
        }
    }

    pub const fn to_u128(self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | u64::from_be_bytes(self.data4) as u128
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{self}}}")
    }
}

/// Interface identifiers understood by the interception layer.
pub mod iid {
    use super::Guid;

    pub const IUNKNOWN: Guid = Guid::from_u128(0x00000000_0000_0000_c000_000000000046);
    pub const ID3D11_DEVICE_CHILD: Guid = Guid::from_u128(0x1841e5c8_16b0_489b_bcc8_44cfb0d5deae);

    pub const ID3D11_DEVICE_CONTEXT: Guid =
        Guid::from_u128(0xc0bfa96c_e089_44fb_8eaf_26f8796190da);
    pub const ID3D11_DEVICE_CONTEXT1: Guid =
        Guid::from_u128(0xbb2c6faa_b5fb_4082_8e6b_388b8cfa90e1);
    pub const ID3D11_DEVICE_CONTEXT2: Guid =
        Guid::from_u128(0x420d5b32_b90c_4da4_bef0_359f6a24a83a);
    pub const ID3D11_DEVICE_CONTEXT3: Guid =
        Guid::from_u128(0xb4e3c01d_e79e_4637_91b2_510e9f4c9b8f);
    pub const ID3D11_DEVICE_CONTEXT4: Guid =
        Guid::from_u128(0x917600da_f58c_4c33_98d8_3e15b390fa24);

    pub const ID3D11_COMMAND_LIST: Guid = Guid::from_u128(0xa24bc4d1_769e_43f7_8013_98ff566c18e2);

    pub const ID3D11_RENDER_TARGET_VIEW: Guid =
        Guid::from_u128(0xdfdba067_0b8d_4865_875b_d7b4516cc164);
    pub const ID3D11_DEPTH_STENCIL_VIEW: Guid =
        Guid::from_u128(0x9fdac92a_1876_48c3_afad_25b94f84a9b6);
    pub const ID3D11_UNORDERED_ACCESS_VIEW: Guid =
        Guid::from_u128(0x28acf509_7f5c_48f6_8611_f316010a6380);

    /// Identity of the intercepting context proxy itself. Only the proxy answers to it.
    pub const AERO_CONTEXT_PROXY: Guid = Guid::from_u128(0x5a3c_e1f0_7d2b_4c61_9e84_13b6a0d2f7c9);
}
