use image::{DynamicImage, GrayImage, RgbImage};

/// A camera frame, either single-channel or 8-bit RGB.
#[derive(Clone, Debug)]
pub enum Frame {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl Frame {
    /// Wrap a decoded image. 8-bit luma stays gray, everything else is
    /// converted to RGB.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => Self::Gray(gray),
            other => Self::Rgb(other.into_rgb8()),
        }
    }

    /// Wrap a raw interleaved buffer with 1 or 3 channels.
    ///
    /// Returns `None` if the channel count is unsupported or the buffer size
    /// does not match `width * height * channels`.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Option<Self> {
        match channels {
            1 => GrayImage::from_raw(width, height, data).map(Self::Gray),
            3 => RgbImage::from_raw(width, height, data).map(Self::Rgb),
            _ => None,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        match self {
            Self::Gray(img) => img.width(),
            Self::Rgb(img) => img.width(),
        }
    }

    #[inline]
    pub fn height(&self) -> u32 {
        match self {
            Self::Gray(img) => img.height(),
            Self::Rgb(img) => img.height(),
        }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray(_) => 1,
            Self::Rgb(_) => 3,
        }
    }

    /// RGB copy of the frame, used for annotation.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img.clone()).into_rgb8(),
            Self::Rgb(img) => img.clone(),
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img),
            Self::Rgb(img) => DynamicImage::ImageRgb8(img),
        }
    }
}

impl From<GrayImage> for Frame {
    fn from(img: GrayImage) -> Self {
        Self::Gray(img)
    }
}

impl From<RgbImage> for Frame {
    fn from(img: RgbImage) -> Self {
        Self::Rgb(img)
    }
}
