//! Mapping lifetime and window checks

use std::io;

use memapp::{
    devmem::{Mapping, PhysMem, Registers, Session},
    dump, Error,
};

use crate::common::Device;

#[test]
fn window_is_bounds_checked() {
    let dev = Device::new("window");
    dev.poke(0x1ffc, 0x5555_aaaa);

    let page = Mapping::open(dev.path(), 0x1234).unwrap();
    assert_eq!(page.page(), 0x1000);
    assert_eq!(page.read32(0xffc).unwrap(), 0x5555_aaaa);

    for &offset in &[0x1000, 0x2000, 2, 0xffe, usize::MAX - 3, usize::MAX] {
        match page.read32(offset) {
            Err(Error::Window { offset: o, size }) => {
                assert_eq!(o, offset);
                assert_eq!(size, 4096);
            }
            res => panic!("offset {:#x}: {:?}", offset, res.map_err(|e| e.to_string())),
        }
    }
    assert!(page.write32(0x1000, 0).is_err());
}

#[test]
fn writes_reach_the_device() {
    let dev = Device::new("writes");

    {
        let page = Mapping::open(dev.path(), 0).unwrap();
        page.write32(8, 0x0bad_cafe).unwrap();
    }

    assert_eq!(dev.peek(8), 0x0bad_cafe);
}

#[test]
fn per_access_session_maps_every_word() {
    let dev = Device::new("per-access");
    let mut mem = PhysMem::new(dev.path(), Session::PerAccess);

    dump::dump(&mut mem, &mut io::sink(), 0x1000, 4, false).unwrap();

    assert_eq!(mem.mappings(), 4);
}

#[test]
fn reused_session_maps_every_page_once() {
    let dev = Device::new("reuse");
    let mut mem = PhysMem::new(dev.path(), Session::Reuse);

    // 0xff8..0x1008 straddles two pages
    dump::dump(&mut mem, &mut io::sink(), 0xff8, 4, false).unwrap();
    assert_eq!(mem.mappings(), 2);

    mem.write(0x1004, 7).unwrap();
    assert_eq!(mem.read(0x1004).unwrap(), 7);
    assert_eq!(mem.mappings(), 2);
}

#[test]
fn both_sessions_print_the_same() {
    let dev = Device::new("sessions");
    for i in 0..12 {
        dev.poke(0xfe0 + 4 * i, 0x6162_6364 + i);
    }

    let mut listings = vec![];
    for &session in &[Session::PerAccess, Session::Reuse] {
        let mut mem = PhysMem::new(dev.path(), session);
        let mut out: Vec<u8> = vec![];
        dump::dump(&mut mem, &mut out, 0xfe0, 12, false).unwrap();
        listings.push(String::from_utf8(out).unwrap());
    }

    assert_eq!(listings[0], listings[1]);
    assert_eq!(listings[0].lines().count(), 3);
}
