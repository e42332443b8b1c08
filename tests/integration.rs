//! End-to-end integration tests.
//!
//! These tests write synthetic PLY files, run the full conversion, and read
//! back the packed binary and generated C files.

use std::fs;
use std::path::{Path, PathBuf};

use plytogx::error::ConvertError;
use plytogx::{ConvertConfig, Pipeline};

struct OutputDirs {
    binary: PathBuf,
    source: PathBuf,
    header: PathBuf,
}

/// Create separate binary/source/header directories under `root`.
fn output_dirs(root: &Path) -> OutputDirs {
    let dirs = OutputDirs {
        binary: root.join("data"),
        source: root.join("source"),
        header: root.join("include"),
    };
    for dir in [&dirs.binary, &dirs.source, &dirs.header] {
        fs::create_dir_all(dir).unwrap();
    }
    dirs
}

fn config(input: &Path, dirs: &OutputDirs) -> ConvertConfig {
    ConvertConfig {
        input: input.to_path_buf(),
        binary_dir: dirs.binary.clone(),
        source_dir: dirs.source.clone(),
        header_dir: dirs.header.clone(),
        ..Default::default()
    }
}

fn be_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_be_bytes(bytes[at..at + 4].try_into().unwrap())
}

/// Unit cube: 8 vertices, 12 triangles, positions only.
fn write_cube(path: &Path) {
    let mut ply = String::from(
        "ply\nformat ascii 1.0\nelement vertex 8\nproperty float x\nproperty float y\nproperty float z\nelement face 12\nproperty list uchar int vertex_indices\nend_header\n",
    );
    for i in 0..8 {
        ply.push_str(&format!("{} {} {}\n", i & 1, (i >> 1) & 1, (i >> 2) & 1));
    }
    let faces = [
        [0, 2, 1], [1, 2, 3], [4, 5, 6], [5, 7, 6],
        [0, 1, 4], [1, 5, 4], [2, 6, 3], [3, 6, 7],
        [0, 4, 2], [2, 4, 6], [1, 3, 5], [3, 7, 5],
    ];
    for [a, b, c] in faces {
        ply.push_str(&format!("3 {a} {b} {c}\n"));
    }
    fs::write(path, ply).unwrap();
}

/// Strip of `n` vertices along x with a single triangle.
fn write_strip(path: &Path, n: usize) {
    let mut ply = format!(
        "ply\nformat ascii 1.0\nelement vertex {n}\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n"
    );
    for i in 0..n {
        ply.push_str(&format!("{i} 0 0\n"));
    }
    ply.push_str(&format!("3 0 1 {}\n", n - 1));
    fs::write(path, ply).unwrap();
}

#[test]
fn position_only_cube() {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = output_dirs(tmp.path());
    let input = tmp.path().join("cube.ply");
    write_cube(&input);

    let result = Pipeline::run(&config(&input, &dirs)).expect("conversion should succeed");
    assert_eq!(result.plan.stride, 12);
    assert_eq!(result.plan.indices, 36);

    let binary = fs::read(dirs.binary.join("cube.mdl")).unwrap();
    assert_eq!(binary.len(), 96);
    // Vertex 7 is (1, 1, 1)
    assert_eq!(be_f32(&binary, 84), 1.0);
    assert_eq!(be_f32(&binary, 88), 1.0);
    assert_eq!(be_f32(&binary, 92), 1.0);
    // Vertex 2 is (0, 1, 0)
    assert_eq!(be_f32(&binary, 24), 0.0);
    assert_eq!(be_f32(&binary, 28), 1.0);

    let source = fs::read_to_string(dirs.source.join("draw_cube.c")).unwrap();
    assert!(source.starts_with("#include <ogc/gx.h>\n#include \"cube_mdl.h\"\n"));
    assert!(source.contains("static const u8 vtxArr[] = {0,2,1,1,2,3,"));
    assert!(source.contains("GX_SetArray(GX_VA_POS, (void*)cube_mdl+0, 12);"));
    assert!(source.contains("GX_Begin(GX_TRIANGLES, GX_VTXFMT0, 36);"));
    assert!(!source.contains("GX_VA_NRM"));
    assert!(!source.contains("GX_VA_CLR0"));

    let header = fs::read_to_string(dirs.header.join("draw_cube.h")).unwrap();
    assert_eq!(header, "#pragma once\nvoid draw_cube(void);\n");

    let outputs = result.outputs.unwrap();
    assert_eq!(outputs.binary, dirs.binary.join("cube.mdl"));
    assert_eq!(outputs.source, dirs.source.join("draw_cube.c"));
    assert_eq!(outputs.header, dirs.header.join("draw_cube.h"));
}

#[test]
fn position_normal_color_alpha_quad() {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = output_dirs(tmp.path());
    let input = tmp.path().join("quad.ply");
    fs::write(
        &input,
        "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
property uchar red
property uchar green
property uchar blue
property uchar alpha
element face 2
property list uchar int vertex_indices
end_header
0 0 0 0 0 1 255 0 0 255
1 0 0 0 0 1 0 255 0 200
1 1 0 0 0 1 0 0 255 100
0 1 0 0 0 1 9 8 7 0
3 0 1 2
3 0 2 3
",
    )
    .unwrap();

    let result = Pipeline::run(&config(&input, &dirs)).unwrap();
    assert_eq!(result.plan.stride, 28);

    let offsets: Vec<(bool, usize)> = result
        .plan
        .groups
        .iter()
        .map(|slot| (slot.present, slot.offset))
        .collect();
    assert_eq!(
        offsets,
        vec![(true, 0), (true, 12), (false, 0), (true, 24), (true, 27)]
    );

    let binary = fs::read(dirs.binary.join("quad.mdl")).unwrap();
    assert_eq!(binary.len(), 112);

    let v2 = &binary[2 * 28..3 * 28];
    assert_eq!(be_f32(v2, 0), 1.0);
    assert_eq!(be_f32(v2, 4), 1.0);
    assert_eq!(be_f32(v2, 20), 1.0);
    assert_eq!(&v2[24..28], &[0, 0, 255, 100]);
    assert_eq!(&binary[3 * 28 + 24..], &[9, 8, 7, 0]);

    let source = fs::read_to_string(dirs.source.join("draw_quad.c")).unwrap();
    assert!(source.contains("GX_SetArray(GX_VA_NRM, (void*)quad_mdl+12, 28);"));
    assert!(source.contains("GX_SetArray(GX_VA_CLR0, (void*)quad_mdl+24, 28);"));
    assert!(source.contains("GX_SetVtxAttrFmt(GX_VTXFMT0, GX_VA_CLR0, GX_CLR_RGBA, GX_RGBA8, 0);"));
    assert!(source.contains("GX_Begin(GX_TRIANGLES, GX_VTXFMT0, 6);"));
}

#[test]
fn missing_position_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = output_dirs(tmp.path());
    let input = tmp.path().join("normals.ply");
    fs::write(
        &input,
        "\
ply
format ascii 1.0
element vertex 3
property float nx
property float ny
property float nz
element face 1
property list uchar int vertex_indices
end_header
0 0 1
0 0 1
0 0 1
3 0 1 2
",
    )
    .unwrap();

    let err = Pipeline::run(&config(&input, &dirs)).unwrap_err();
    assert!(matches!(err, ConvertError::MissingRequiredAttribute));

    for dir in [&dirs.binary, &dirs.source, &dirs.header] {
        assert_eq!(fs::read_dir(dir).unwrap().count(), 0, "{}", dir.display());
    }
}

#[test]
fn index_width_boundary() {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = output_dirs(tmp.path());

    let small = tmp.path().join("small.ply");
    write_strip(&small, 255);
    Pipeline::run(&config(&small, &dirs)).unwrap();
    let source = fs::read_to_string(dirs.source.join("draw_small.c")).unwrap();
    assert!(source.contains("static const u8 vtxArr[] = {0,1,254,};"));
    assert!(source.contains("GX_SetVtxDesc(GX_VA_POS, GX_INDEX8);"));
    assert!(source.contains("\tGX_Position1x8(vtxArr[i]);"));

    let large = tmp.path().join("large.ply");
    write_strip(&large, 256);
    Pipeline::run(&config(&large, &dirs)).unwrap();
    let source = fs::read_to_string(dirs.source.join("draw_large.c")).unwrap();
    assert!(source.contains("static const u16 vtxArr[] = {0,1,255,};"));
    assert!(source.contains("GX_SetVtxDesc(GX_VA_POS, GX_INDEX16);"));
    assert!(source.contains("\tGX_Position1x16(vtxArr[i]);"));

    assert_eq!(fs::read(dirs.binary.join("large.mdl")).unwrap().len(), 256 * 12);
}

#[test]
fn binary_ply_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = output_dirs(tmp.path());
    let input = tmp.path().join("tex.ply");

    let positions = [[0.125f32, -3.5, 7.0], [1e-3, 2.5e6, -0.0], [3.0, 4.0, 5.0]];
    let uvs = [[0.0f32, 1.0], [0.25, 0.75], [1.0, 0.0]];

    let mut content = b"ply
format binary_little_endian 1.0
element vertex 3
property float x
property float y
property float z
property float s
property float t
element face 1
property list uchar int vertex_indices
end_header
"
    .to_vec();
    for (p, uv) in positions.iter().zip(&uvs) {
        for v in p.iter().chain(uv) {
            content.extend_from_slice(&v.to_le_bytes());
        }
    }
    content.push(3);
    for i in [0i32, 1, 2] {
        content.extend_from_slice(&i.to_le_bytes());
    }
    fs::write(&input, content).unwrap();

    let result = Pipeline::run(&config(&input, &dirs)).unwrap();
    assert_eq!(result.plan.stride, 20);

    let binary = fs::read(dirs.binary.join("tex.mdl")).unwrap();
    assert_eq!(binary.len(), 3 * 20);
    for (i, (p, uv)) in positions.iter().zip(&uvs).enumerate() {
        let base = i * 20;
        for (k, expected) in p.iter().enumerate() {
            assert_eq!(be_f32(&binary, base + 4 * k).to_bits(), expected.to_bits());
        }
        assert_eq!(be_f32(&binary, base + 12), uv[0]);
        assert_eq!(be_f32(&binary, base + 16), uv[1]);
    }
}

#[test]
fn missing_output_dir_reports_path() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("cube.ply");
    write_cube(&input);

    let config = ConvertConfig {
        input: input.clone(),
        binary_dir: tmp.path().join("does-not-exist"),
        source_dir: tmp.path().to_path_buf(),
        header_dir: tmp.path().to_path_buf(),
        ..Default::default()
    };

    match Pipeline::run(&config).unwrap_err() {
        ConvertError::Output { path, .. } => {
            assert_eq!(path, tmp.path().join("does-not-exist").join("cube.mdl"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!tmp.path().join("draw_cube.c").exists());
}

#[test]
fn missing_input_returns_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dirs = output_dirs(tmp.path());
    let err = Pipeline::run(&config(&tmp.path().join("nonexistent.ply"), &dirs));
    assert!(err.is_err(), "missing input should return error");
}
