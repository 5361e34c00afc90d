use spritearc::{legacy::*, ImportOutcome};

type Importer = fn(&[u8], &Palette, IndexOffset) -> ImportOutcome;

const IMPORTERS: [(&[u8], Importer); 4] = [
  (&OBL3_SIGNATURE, import_obl3),
  (&OBL4_SIGNATURE, import_obl4),
  (&GE96_SIGNATURE, import_ge96),
  (&IMC1_SIGNATURE, import_imc1),
];

#[test]
fn test_importers_no_panics() {
  for (path, v) in super::test_files() {
    println!("{}", path.display());
    for (_, import) in IMPORTERS {
      let _ = import(&v, &DOS_PALETTE, IndexOffset::TILES);
    }
    let _ = import_ima(&v, &DOS_PALETTE, IndexOffset::NONE);
  }
  for size in [0, 3, 40, 1100, 2000] {
    for _ in 0..10 {
      let junk = super::rand_bytes(size);
      for (signature, import) in IMPORTERS {
        let mut v = signature.to_vec();
        v.extend_from_slice(&junk);
        let _ = import(&v, &DOS_PALETTE, IndexOffset::TILES);
      }
      let _ = import_ima(&junk, &DOS_PALETTE, IndexOffset::NONE);
    }
  }
}

#[test]
fn test_wrong_signature_is_not_this_format() {
  let junk = b"RIFF\0\0\0\0WAVEfmt ";
  for (_, import) in IMPORTERS {
    assert_eq!(import(junk, &DOS_PALETTE, IndexOffset::TILES), ImportOutcome::NotThisFormat);
  }
  assert_eq!(import_ima(junk, &DOS_PALETTE, IndexOffset::NONE), ImportOutcome::NotThisFormat);
}

#[test]
fn test_expand_runs_no_panics() {
  for _ in 0..50 {
    let rle = super::rand_bytes(300);
    if let Ok(out) = expand_runs(&rle, 256) {
      assert_eq!(out.len(), 256);
    }
  }
}
