use std::{env, path::PathBuf};

/// pkg-config names, most dependent first so static linking resolves in order.
const LIBRARIES: [&str; 5] = ["avdevice", "avformat", "avcodec", "avfilter", "avutil"];

struct Paths {
    include: Vec<String>,
    lib: Vec<String>,
}

fn main() {
    for var in [
        "FFMPEG_DIR",
        "FFMPEG_INCLUDE_DIR",
        "FFMPEG_LIB_DIR",
        "FFMPEG_STATIC",
    ] {
        println!("cargo:rerun-if-env-changed={}", var);
    }
    println!("cargo:rerun-if-changed=include/wrapper.h");

    let static_link = env::var("FFMPEG_STATIC").map(|v| v == "1").unwrap_or(false);

    let mut paths = match env::var("FFMPEG_DIR") {
        Ok(dir) => Paths {
            include: vec![format!("{}/include", dir)],
            lib: vec![format!("{}/lib", dir)],
        },
        Err(_) => probe_pkg_config(static_link).unwrap_or_else(|e| {
            eprintln!("pkg-config failed: {}", e);
            eprintln!("Set FFMPEG_DIR to point to your FFmpeg installation");
            panic!("Cannot find FFmpeg libraries");
        }),
    };

    // Explicit directories win over whatever discovery produced
    if let Ok(dir) = env::var("FFMPEG_INCLUDE_DIR") {
        paths.include.insert(0, dir);
    }
    if let Ok(dir) = env::var("FFMPEG_LIB_DIR") {
        paths.lib.insert(0, dir);
    }

    emit_link_directives(&paths, static_link);
    generate_bindings(&paths);
}

fn emit_link_directives(paths: &Paths, static_link: bool) {
    for dir in &paths.lib {
        println!("cargo:rustc-link-search=native={}", dir);
    }

    let kind = if static_link { "static" } else { "dylib" };
    for lib in LIBRARIES {
        println!("cargo:rustc-link-lib={}={}", kind, lib);
    }

    if !static_link {
        return;
    }

    // Static FFmpeg builds drag in their own system dependencies
    #[cfg(target_os = "linux")]
    for lib in ["z", "bz2", "lzma", "m", "pthread"] {
        println!("cargo:rustc-link-lib={}", lib);
    }
    #[cfg(target_os = "macos")]
    {
        for lib in ["z", "bz2", "lzma", "iconv"] {
            println!("cargo:rustc-link-lib={}", lib);
        }
        for framework in [
            "AudioToolbox",
            "AVFoundation",
            "CoreAudio",
            "CoreMedia",
            "CoreVideo",
            "Security",
        ] {
            println!("cargo:rustc-link-lib=framework={}", framework);
        }
    }
}

fn generate_bindings(paths: &Paths) {
    let bindings = bindgen::Builder::default()
        .header("include/wrapper.h")
        .clang_args(paths.include.iter().map(|dir| format!("-I{}", dir)))
        .allowlist_type("AV.*")
        .allowlist_function("av_.*")
        .allowlist_function("avdevice_.*")
        .allowlist_function("avformat_.*")
        .allowlist_function("avcodec_.*")
        .allowlist_function("avfilter_.*")
        .allowlist_var("AV.*")
        .allowlist_var("FF_.*")
        .allowlist_var("AVERROR.*")
        .allowlist_var("LIBAV.*")
        .blocklist_type("max_align_t")
        .use_core()
        .ctypes_prefix("libc")
        .rustified_enum("AV.*")
        .layout_tests(false)
        .generate()
        .expect("Unable to generate FFmpeg bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings");
}

fn probe_pkg_config(static_link: bool) -> Result<Paths, String> {
    let mut paths = Paths {
        include: Vec::new(),
        lib: Vec::new(),
    };

    for name in LIBRARIES {
        let lib = pkg_config::Config::new()
            .statik(static_link)
            // Link directives are emitted once, in `emit_link_directives`
            .cargo_metadata(false)
            .probe(&format!("lib{}", name))
            .map_err(|e| format!("lib{}: {}", name, e))?;

        push_unique(&mut paths.include, lib.include_paths);
        push_unique(&mut paths.lib, lib.link_paths);
    }

    Ok(paths)
}

fn push_unique(into: &mut Vec<String>, found: Vec<PathBuf>) {
    for path in found {
        let path = path.to_string_lossy().into_owned();
        if !into.contains(&path) {
            into.push(path);
        }
    }
}
