use xnbkit::formats::legacy::{LegacyLayout, LegacyMode};
use xnbkit::formats::xnb::DecoderState;
use xnbkit::readers::{ReaderEntry, texture2d};
use xnbkit::surface::SurfaceFormat;
use xnbkit::{DecodeOptions, Diagnostic, Diagnostics, Error, Registry, XnbDecoder, decode, decode_with};

const TEXTURE_READER: &str = "Microsoft.Xna.Framework.Content.Texture2DReader";

fn uleb128(out: &mut Vec<u8>, mut n: u32) {
    loop {
        let byte = (n & 0x7F) as u8;
        n >>= 7;
        if n == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Build a v5 container with one object per reader, each a texture.
fn container(readers: &[&str], textures: &[(i32, i32, i32, Vec<Vec<u8>>)]) -> Vec<u8> {
    let mut out = b"XNBd".to_vec();
    out.push(5);
    out.push(0);
    out.extend_from_slice(&0i32.to_le_bytes());
    uleb128(&mut out, readers.len() as u32);
    for name in readers {
        uleb128(&mut out, name.len() as u32);
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&0i32.to_le_bytes());
    }
    uleb128(&mut out, 0);
    for (format, width, height, levels) in textures {
        uleb128(&mut out, 1);
        for v in [*format, *width, *height, levels.len() as i32] {
            out.extend_from_slice(&v.to_le_bytes());
        }
        for level in levels {
            out.extend_from_slice(&(level.len() as u32).to_le_bytes());
            out.extend_from_slice(level);
        }
    }
    let size = out.len() as i32;
    out[6..10].copy_from_slice(&size.to_le_bytes());
    out
}

#[test]
fn decode_single_color_texture() {
    let pixels: Vec<u8> = (0..16).collect();
    let data = container(&[TEXTURE_READER], &[(0, 2, 2, vec![pixels.clone()])]);

    let decoded = decode(&data).expect("container should decode");
    let header = decoded.header.expect("modern container has a header");
    assert_eq!(header.platform, 'd');
    assert_eq!(header.version, 5);
    assert_eq!(header.declared_size as usize, data.len());
    assert!(!decoded.is_legacy());
    assert_eq!(decoded.contents.len(), 1);
    assert!(decoded.diagnostics.is_empty());

    let texture = decoded.contents[0].as_texture().unwrap();
    assert_eq!(texture.surface_format, SurfaceFormat::Color);
    let mut diags = Diagnostics::new();
    let images = texture.images(&mut diags);
    assert_eq!(images.len(), 1);
    assert_eq!((images[0].width, images[0].height), (2, 2));
    assert_eq!(images[0].as_raw(), pixels.as_slice());
    // Color has no converter: bytes pass through and the caller is told.
    assert_eq!(
        diags.iter().collect::<Vec<_>>(),
        [&Diagnostic::UnsupportedSurfaceFormat(SurfaceFormat::Color)]
    );
}

#[test]
fn unknown_reader_yields_nothing() {
    let data = container(
        &["Microsoft.Xna.Framework.Content.SpriteFontReader"],
        &[(0, 1, 1, vec![vec![0; 4]])],
    );
    match decode(&data) {
        Err(Error::UnknownReaderType(name)) => {
            assert_eq!(name, "Microsoft.Xna.Framework.Content.SpriteFontReader")
        }
        other => panic!("expected UnknownReaderType, got {other:?}"),
    }
}

#[test]
fn one_bad_level_out_of_two() {
    let data = container(&[TEXTURE_READER], &[(0, 4, 4, vec![vec![0; 64], vec![0; 5]])]);
    let decoded = decode(&data).unwrap();
    let texture = decoded.textures().next().unwrap();

    let mut diags = Diagnostics::new();
    let images = texture.images(&mut diags);
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].level, 0);
    assert!(matches!(
        texture.decode_level(1, &mut Diagnostics::new()),
        Err(Error::ShapeMismatch { level: 1, width: 2, height: 2, len: 5 })
    ));
    assert!(diags.iter().any(|d| matches!(d, Diagnostic::LevelSkipped { level: 1, .. })));
}

#[test]
fn bgra_levels_are_swizzled() {
    let level0 = [1u8, 2, 3, 4].repeat(4);
    let data = container(&[TEXTURE_READER], &[(21, 2, 2, vec![level0, vec![5, 6, 7, 8]])]);
    let decoded = decode(&data).unwrap();
    let images = decoded.textures().next().unwrap().images(&mut Diagnostics::new());
    assert_eq!(images[0].pixel(0, 0), Some([3, 2, 1, 4]));
    assert_eq!(images[1].as_raw(), &[7, 6, 5, 8]);
}

#[test]
fn legacy_fallback_produces_one_texture() {
    let mut data = vec![0x10; 10];
    for v in [1i32, 2, 2, 1] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&16u32.to_le_bytes());
    data.extend_from_slice(&[0x40; 16]);

    let decoded = decode(&data).unwrap();
    assert!(decoded.header.is_none());
    assert_eq!(decoded.legacy, Some(LegacyLayout::Compact));
    assert_eq!(decoded.contents.len(), 1);
    assert!(
        decoded
            .diagnostics
            .iter()
            .any(|d| *d == Diagnostic::LegacyFallback(LegacyLayout::Compact))
    );

    let images = decoded.textures().next().unwrap().images(&mut Diagnostics::new());
    assert_eq!(images.len(), 1);
    assert_eq!((images[0].width, images[0].height), (2, 2));
}

#[test]
fn legacy_can_be_refused() {
    let mut data = vec![0; 13];
    for v in [0i32, 1, 1, 1] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&4u16.to_le_bytes());
    data.extend_from_slice(&[9; 4]);

    assert_eq!(decode(&data).unwrap().legacy, Some(LegacyLayout::Extended));

    let options = DecodeOptions::default().set_legacy_mode(LegacyMode::Reject);
    assert!(matches!(
        decode_with(&data, Registry::builtin(), options),
        Err(Error::InvalidLegacyContainer(_))
    ));
    assert!(matches!(decode(b"XN"), Err(Error::InvalidLegacyContainer(_))));
}

#[test]
fn custom_registry_entries() {
    const ALIAS: &str = "MyGame.Content.AtlasPageReader";
    let registry = Registry::empty().with(ReaderEntry {
        type_name: ALIAS,
        version: 0,
        read: texture2d::read,
    });
    let data = container(&[ALIAS], &[(0, 1, 1, vec![vec![1, 2, 3, 4]])]);

    let decoded = decode_with(&data, &registry, DecodeOptions::default()).unwrap();
    assert_eq!(decoded.manifest[0].type_name, ALIAS);
    assert_eq!(decoded.textures().count(), 1);

    // The built-in table does not know the alias.
    assert!(matches!(decode(&data), Err(Error::UnknownReaderType(_))));
}

#[test]
fn failed_decoder_reports_the_same_error() {
    let mut data = container(&[TEXTURE_READER], &[(0, 1, 1, vec![vec![0; 4]])]);
    data[4] = 3;
    let mut decoder = XnbDecoder::new(&data);
    assert!(matches!(decoder.step(), Err(Error::UnsupportedVersion(3))));
    assert_eq!(decoder.state(), DecoderState::Failed);
    assert!(matches!(decoder.decode(), Err(Error::UnsupportedVersion(3))));
}

#[test]
fn assembly_qualified_reader_name() {
    let name = "Microsoft.Xna.Framework.Content.Texture2DReader, Microsoft.Xna.Framework.Graphics, \
                Version=4.0.0.0, Culture=neutral, PublicKeyToken=842cf8be1de50553";
    let data = container(&[name], &[(0, 1, 1, vec![vec![0; 4]])]);
    let decoded = decode(&data).unwrap();
    assert_eq!(decoded.manifest[0].type_name, name);
    assert_eq!(decoded.contents.len(), 1);
}

#[cfg(feature = "encode")]
#[test]
fn save_textures_to_disk() {
    use xnbkit::encode::ImageFormat;

    let dir = tempfile::tempdir().unwrap();
    let data = container(
        &[TEXTURE_READER],
        &[(0, 4, 2, vec![vec![200; 32], vec![100; 8], vec![7; 3]])],
    );
    let mut decoded = decode(&data).unwrap();
    let written = decoded
        .save_textures(dir.path().join("tiles"), ImageFormat::Png)
        .unwrap();
    assert_eq!(written, 2);

    let level1 = image::open(dir.path().join("tiles-1.png")).unwrap();
    assert_eq!((level1.width(), level1.height()), (2, 1));
    assert!(!dir.path().join("tiles-2.png").exists());
    assert!(decoded.diagnostics.has_lossy());
}
